mod common;

use axum_test::TestServer;
use codepush_server::api::{self, AcquisitionConfig};

#[tokio::test]
async fn test_health_endpoint_success() {
    let storage = common::create_test_storage().await;
    let app = api::health(&AcquisitionConfig {
        storage,
        public_url: common::PUBLIC_URL.to_string(),
    });

    let server = TestServer::new(app).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["storage"]["status"], "ok");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let storage = common::create_test_storage().await;
    let app = api::health(&AcquisitionConfig {
        storage,
        public_url: common::PUBLIC_URL.to_string(),
    });

    let server = TestServer::new(app).unwrap();

    let response = server.get("/health").await;

    let json = response.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json["checks"].get("storage").is_some());
}
