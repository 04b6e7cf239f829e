mod common;

use axum::{
    Extension, Router,
    body::{Body, Bytes},
    http::{Method, Request, StatusCode},
    routing::{get, post},
};
use axum_test::{
    TestServer,
    multipart::{MultipartForm, Part},
};
use codepush_server::api;
use codepush_server::config::Config;
use codepush_server::routes::app_router;
use std::time::Duration;
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        listen_addr: "127.0.0.1:0".to_string(),
        public_url: common::PUBLIC_URL.to_string(),
        log_level: "info".to_string(),
        log_format: "text".to_string(),
        upload_size_limit_mb: 1,
        request_timeout_ms: 5_000,
        access_key_signing_secret: common::SIGNING_SECRET.to_string(),
        cli_version: Some("1.2.3".to_string()),
        cors_allowed_origin: "*".to_string(),
        instrumentation_key: Some("ikey".to_string()),
        auth_default_provider: "github".to_string(),
        auth_providers: vec![(
            "github".to_string(),
            "https://github.com/login/oauth/authorize".to_string(),
        )],
        seed_access_key: None,
    }
}

#[tokio::test]
async fn test_app_router_serves_health_with_headers() {
    let storage = common::create_test_storage().await;
    let app = app_router(&test_config(), storage);

    let response = app
        .oneshot(Request::get("/health/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(response.headers()["x-codepush-cli-version"], "1.2.3");
}

#[tokio::test]
async fn test_app_router_protects_management() {
    let storage = common::create_test_storage().await;
    let app = app_router(&test_config(), storage);

    let response = app
        .oneshot(Request::get("/apps").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_app_router_answers_preflight() {
    let storage = common::create_test_storage().await;
    let app = app_router(&test_config(), storage);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/apps")
                .header("origin", "https://portal.example.com")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(
        response.headers()["access-control-allow-methods"],
        "GET,POST,PATCH,DELETE"
    );
}

#[tokio::test]
async fn test_request_timeout_factory() {
    let app = Router::new()
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                "late"
            }),
        )
        .layer(api::request_timeout_handler(Duration::from_millis(20)));
    let server = TestServer::new(app).unwrap();

    let response = server.get("/slow").await;

    response.assert_status(StatusCode::REQUEST_TIMEOUT);
    response.assert_text("Request timed out");
}

#[tokio::test]
async fn test_input_sanitizer_factory() {
    let app = Router::new()
        .route(
            "/echo",
            post(|body: String| async move { body }),
        )
        .layer(api::input_sanitizer());
    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/echo")
        .json(&serde_json::json!({ "name": "  MyApp\u{0007} " }))
        .await;

    response.assert_status_ok();
    response.assert_text(r#"{"name":"MyApp"}"#);
}

#[tokio::test]
async fn test_input_sanitizer_factory_rejects_oversized_json() {
    let app = Router::new()
        .route("/echo", post(|body: String| async move { body }))
        .layer(api::input_sanitizer());
    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/echo")
        .content_type("application/json")
        .bytes(Bytes::from(vec![b' '; 2 * 1_048_576]))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

async fn count_files(Extension(uploaded): Extension<api::UploadedFiles>) -> String {
    uploaded
        .files
        .iter()
        .map(|f| f.size)
        .sum::<usize>()
        .to_string()
}

#[tokio::test]
async fn test_file_upload_factory_alone_accepts_large_parts() {
    let app = Router::new()
        .route("/upload", post(count_files))
        .layer(api::file_upload_middleware(200));
    let server = TestServer::new(app).unwrap();
    let form = MultipartForm::new().add_part(
        "package",
        Part::bytes(vec![1u8; 5 * 1_048_576]).file_name("bundle.zip"),
    );

    let response = server.post("/upload").multipart(form).await;

    response.assert_status_ok();
    response.assert_text((5 * 1_048_576).to_string());
}

#[tokio::test]
async fn test_file_upload_factory_rejects_parts_over_limit() {
    let app = Router::new()
        .route("/upload", post(count_files))
        .layer(api::file_upload_middleware(2));
    let server = TestServer::new(app).unwrap();
    let form = MultipartForm::new().add_part(
        "package",
        Part::bytes(vec![1u8; 3 * 1_048_576]).file_name("bundle.zip"),
    );

    let response = server.post("/upload").multipart(form).await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    response.assert_text("The uploaded file is larger than the size limit of 2 megabytes.");
}

#[tokio::test]
async fn test_app_insights_factory_counts_requests() {
    let insights = api::app_insights(&api::TelemetryConfig {
        instrumentation_key: Some("ikey".to_string()),
    });
    let app = Router::new()
        .route("/ok", get(|| async { "ok" }))
        .route(
            "/boom",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .layer(insights.error_handler())
        .layer(insights.request_tracker());
    let server = TestServer::new(app).unwrap();

    server.get("/ok").await.assert_status_ok();
    server
        .get("/boom")
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let snapshot = insights.telemetry().snapshot();
    assert_eq!(snapshot.requests, 2);
    assert_eq!(snapshot.failed_requests, 1);
    assert_eq!(snapshot.exceptions, 1);
}
