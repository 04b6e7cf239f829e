#![allow(dead_code)]

use axum_test::TestServer;
use codepush_server::api::{
    self, AcquisitionConfig, Authentication, AuthenticationConfig, ManagementConfig,
};
use codepush_server::infrastructure::storage::InMemoryStorage;
use codepush_server::server::seed_account;
use serde_json::{Value, json};
use std::sync::Arc;

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const ACCESS_KEY: &str = "test-access-key";
pub const PUBLIC_URL: &str = "http://codepush.test";

pub async fn create_test_storage() -> Arc<InMemoryStorage> {
    let storage = Arc::new(InMemoryStorage::new());
    seed_account(&storage, SIGNING_SECRET, ACCESS_KEY)
        .await
        .unwrap();
    storage
}

pub fn create_test_auth(storage: Arc<InMemoryStorage>) -> Authentication {
    api::auth(AuthenticationConfig {
        storage,
        signing_secret: SIGNING_SECRET.to_string(),
        providers: vec![(
            "github".to_string(),
            "https://github.com/login/oauth/authorize".to_string(),
        )],
        default_provider: "github".to_string(),
    })
}

pub fn management_server(storage: Arc<InMemoryStorage>, upload_size_limit_mb: u64) -> TestServer {
    let auth = create_test_auth(storage.clone());
    let app = api::management(&ManagementConfig {
        storage,
        upload_size_limit_mb,
    })
    .route_layer(auth.authenticate());
    TestServer::new(app).unwrap()
}

pub fn acquisition_server(storage: Arc<InMemoryStorage>) -> TestServer {
    let app = api::acquisition(&AcquisitionConfig {
        storage,
        public_url: PUBLIC_URL.to_string(),
    });
    TestServer::new(app).unwrap()
}

/// Creates an app and returns the key of one of its deployments.
pub async fn create_app_with_key(server: &TestServer, app: &str, deployment: &str) -> String {
    server
        .post("/apps")
        .authorization_bearer(ACCESS_KEY)
        .json(&json!({ "name": app }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let json = server
        .get(&format!("/apps/{app}/deployments"))
        .authorization_bearer(ACCESS_KEY)
        .await
        .json::<Value>();

    json["deployments"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["name"] == deployment)
        .unwrap()["key"]
        .as_str()
        .unwrap()
        .to_string()
}

pub fn package_info(app_version: &str) -> String {
    json!({ "appVersion": app_version, "description": "Fixes", "isMandatory": true }).to_string()
}
