//! The layer type shared by every middleware factory.
//!
//! Middleware are written as `async fn(State<_>, Request, Next)` and mounted
//! with `axum::middleware::from_fn_with_state`, or built from `tower` and
//! `tower-http` layers. Factories box the result into [`MiddlewareLayer`] so
//! callers get one nameable type to stack with `Router::layer`.

use axum::{extract::Request, response::Response, routing::Route};
use std::convert::Infallible;
use tower::util::BoxCloneSyncServiceLayer;

/// A boxed, cloneable layer over axum routes.
pub type MiddlewareLayer = BoxCloneSyncServiceLayer<Route, Request, Response, Infallible>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        extract::State,
        http::StatusCode,
        middleware::{Next, from_fn, from_fn_with_state},
        response::IntoResponse,
        routing::get,
    };
    use tower::ServiceExt;

    async fn tag(State(value): State<&'static str>, req: Request, next: Next) -> Response {
        let mut res = next.run(req).await;
        res.headers_mut()
            .insert("x-tag", value.parse().expect("static header"));
        res
    }

    async fn deny(_req: Request, _next: Next) -> Response {
        StatusCode::FORBIDDEN.into_response()
    }

    #[tokio::test]
    async fn test_middleware_wraps_response() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(MiddlewareLayer::new(from_fn_with_state("seen", tag)));

        let res = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["x-tag"], "seen");
    }

    #[tokio::test]
    async fn test_middleware_can_short_circuit() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(MiddlewareLayer::new(from_fn(deny)));

        let res = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_layer_is_cloneable_across_routers() {
        let layer = MiddlewareLayer::new(from_fn_with_state("shared", tag));
        let first = Router::new()
            .route("/a", get(|| async { "a" }))
            .layer(layer.clone());
        let app = Router::new()
            .route("/b", get(|| async { "b" }))
            .layer(layer)
            .merge(first);

        for uri in ["/a", "/b"] {
            let res = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(res.headers()["x-tag"], "shared");
        }
    }
}
