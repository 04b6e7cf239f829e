mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{Value, json};

const MB: usize = 1_048_576;

fn release_form(app_version: &str, bundle: Vec<u8>) -> MultipartForm {
    MultipartForm::new()
        .add_text("packageInfo", common::package_info(app_version))
        .add_part(
            "package",
            Part::bytes(bundle)
                .file_name("bundle.zip")
                .mime_type("application/zip"),
        )
}

// ─── AUTH ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_management_requires_access_key() {
    let server = common::management_server(common::create_test_storage().await, 10);

    let response = server.get("/apps").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.header("www-authenticate"), "Bearer");
}

#[tokio::test]
async fn test_management_rejects_unknown_key() {
    let server = common::management_server(common::create_test_storage().await, 10);

    let response = server.get("/apps").authorization_bearer("wrong-key").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn test_account_endpoint() {
    let server = common::management_server(common::create_test_storage().await, 10);

    let response = server
        .get("/account")
        .authorization_bearer(common::ACCESS_KEY)
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["account"]["id"], "default");
    assert!(json["account"].get("createdAt").is_some());
}

// ─── APPS ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_and_list_apps() {
    let server = common::management_server(common::create_test_storage().await, 10);

    let response = server
        .post("/apps")
        .authorization_bearer(common::ACCESS_KEY)
        .json(&json!({ "name": "MyApp" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let json = response.json::<Value>();
    assert_eq!(json["app"]["name"], "MyApp");
    assert_eq!(json["app"]["deployments"], json!(["Staging", "Production"]));

    let response = server
        .get("/apps")
        .authorization_bearer(common::ACCESS_KEY)
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["apps"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_duplicate_app_conflict() {
    let server = common::management_server(common::create_test_storage().await, 10);
    common::create_app_with_key(&server, "MyApp", "Staging").await;

    let response = server
        .post("/apps")
        .authorization_bearer(common::ACCESS_KEY)
        .json(&json!({ "name": "myapp" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_deployments_of_unknown_app() {
    let server = common::management_server(common::create_test_storage().await, 10);

    let response = server
        .get("/apps/Missing/deployments")
        .authorization_bearer(common::ACCESS_KEY)
        .await;

    response.assert_status_not_found();
}

// ─── RELEASE ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_release_success() {
    let server = common::management_server(common::create_test_storage().await, 10);
    common::create_app_with_key(&server, "MyApp", "Staging").await;

    let response = server
        .post("/apps/MyApp/deployments/Staging/release")
        .authorization_bearer(common::ACCESS_KEY)
        .multipart(release_form("1.0.0", b"bundle-v1".to_vec()))
        .await;

    response.assert_status(StatusCode::CREATED);
    let json = response.json::<Value>();
    assert_eq!(json["package"]["label"], "v1");
    assert_eq!(json["package"]["appVersion"], "1.0.0");
    assert_eq!(json["package"]["isMandatory"], true);
    assert_eq!(json["package"]["size"], 9);
    assert_eq!(json["package"]["packageHash"].as_str().unwrap().len(), 64);

    let response = server
        .post("/apps/MyApp/deployments/Staging/release")
        .authorization_bearer(common::ACCESS_KEY)
        .multipart(release_form("1.0.0", b"bundle-v2".to_vec()))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["package"]["label"], "v2");
}

#[tokio::test]
async fn test_release_without_package_file() {
    let server = common::management_server(common::create_test_storage().await, 10);
    common::create_app_with_key(&server, "MyApp", "Staging").await;

    let form = MultipartForm::new().add_text("packageInfo", common::package_info("1.0.0"));

    let response = server
        .post("/apps/MyApp/deployments/Staging/release")
        .authorization_bearer(common::ACCESS_KEY)
        .multipart(form)
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_release_larger_than_limit() {
    let server = common::management_server(common::create_test_storage().await, 1);
    common::create_app_with_key(&server, "MyApp", "Staging").await;

    let response = server
        .post("/apps/MyApp/deployments/Staging/release")
        .authorization_bearer(common::ACCESS_KEY)
        .multipart(release_form("1.0.0", vec![0u8; MB + 1]))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    response.assert_text("The uploaded file is larger than the size limit of 1 megabytes.");
}

#[tokio::test]
async fn test_release_above_default_body_limit_within_upload_limit() {
    let server = common::management_server(common::create_test_storage().await, 4);
    common::create_app_with_key(&server, "MyApp", "Staging").await;

    let response = server
        .post("/apps/MyApp/deployments/Staging/release")
        .authorization_bearer(common::ACCESS_KEY)
        .multipart(release_form("1.0.0", vec![1u8; 3 * MB]))
        .await;

    response.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_release_to_unknown_deployment() {
    let server = common::management_server(common::create_test_storage().await, 10);
    common::create_app_with_key(&server, "MyApp", "Staging").await;

    let response = server
        .post("/apps/MyApp/deployments/Beta/release")
        .authorization_bearer(common::ACCESS_KEY)
        .multipart(release_form("1.0.0", b"bundle".to_vec()))
        .await;

    response.assert_status_not_found();
}
