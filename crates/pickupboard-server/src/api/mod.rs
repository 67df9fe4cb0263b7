mod availability;
mod dashboard;

use std::any::Any;

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::cache::{CoordinatorError, SnapshotCoordinator};
use crate::middleware::{request_id, REQUEST_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub coordinator: SnapshotCoordinator,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_coordinator_error(request_id: &str, error: &CoordinatorError) -> ApiError {
    tracing::error!(request_id, error = %error, "availability request failed");
    ApiError::new("internal_error", "snapshot refresh failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([REQUEST_ID_HEADER])
}

/// Converts a handler panic into the generic 500 JSON body.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    tracing::error!(panic = detail, "request handler panicked");
    ApiError::new("internal_error", "internal server error").into_response()
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/api/availability", get(availability::get_availability))
        .route("/healthz", get(healthz))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::Utc;
    use pickupboard_core::Snapshot;
    use pickupboard_scraper::{ScraperError, SnapshotBuilder};
    use tower::ServiceExt;

    use super::*;
    use crate::cache::MemorySnapshotStore;

    enum Behaviour {
        Succeed,
        Fail,
        Panic,
    }

    struct StubBuilder(Behaviour);

    #[async_trait]
    impl SnapshotBuilder for StubBuilder {
        async fn build(&self) -> Result<Snapshot, ScraperError> {
            match self.0 {
                Behaviour::Succeed => Ok(Snapshot::placeholder(Utc::now())),
                Behaviour::Fail => Err(ScraperError::NoPartsDiscovered { families: 4 }),
                Behaviour::Panic => panic!("listing payload changed shape"),
            }
        }
    }

    fn app(behaviour: Behaviour) -> Router {
        let coordinator = SnapshotCoordinator::new(
            Arc::new(StubBuilder(behaviour)),
            Arc::new(MemorySnapshotStore::default()),
            3600,
        );
        build_app(AppState { coordinator })
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response")
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json parse")
    }

    #[tokio::test]
    async fn healthz_returns_ok() {
        let response = get(app(Behaviour::Succeed), "/healthz").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn unknown_route_is_plain_404() {
        let response = get(app(Behaviour::Succeed), "/api/unknown").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        assert_eq!(&body[..], b"Not Found");
    }

    #[tokio::test]
    async fn wrong_method_on_known_path_is_plain_404() {
        for (method, uri) in [
            (Method::POST, "/api/availability"),
            (Method::DELETE, "/healthz"),
            (Method::PUT, "/"),
        ] {
            let response = app(Behaviour::Succeed)
                .oneshot(
                    Request::builder()
                        .method(method.clone())
                        .uri(uri)
                        .body(Body::empty())
                        .expect("request"),
                )
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {uri}");
            assert!(response.headers().contains_key("x-request-id"));
            let body = to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("body bytes");
            assert_eq!(&body[..], b"Not Found", "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn head_on_health_check_is_allowed() {
        let response = app(Behaviour::Succeed)
            .oneshot(
                Request::builder()
                    .method(Method::HEAD)
                    .uri("/healthz")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let response = app(Behaviour::Succeed)
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .header("x-request-id", "req-123")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(
            response.headers().get("x-request-id").map(|v| v.as_bytes()),
            Some(&b"req-123"[..])
        );
    }

    #[tokio::test]
    async fn cors_preflight_succeeds_with_empty_body() {
        let response = app(Behaviour::Succeed)
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/availability")
                    .header(header::ORIGIN, "https://example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert!(response.status().is_success());
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .map(|v| v.as_bytes()),
            Some(&b"*"[..])
        );
        let methods = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(methods.contains("GET"), "allow-methods: {methods}");
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn availability_cold_start_serves_warmup() {
        let response = get(app(Behaviour::Succeed), "/api/availability").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CACHE_CONTROL)
                .map(|v| v.as_bytes()),
            Some(&b"public, max-age=10, s-maxage=30, stale-while-revalidate=120"[..])
        );
        assert_eq!(
            response.headers().get("x-cache").map(|v| v.as_bytes()),
            Some(&b"cold-start"[..])
        );
        let json = body_json(response).await;
        assert_eq!(json["source"], "warmup");
        assert!(json["generatedAt"].is_string());
    }

    #[tokio::test]
    async fn forced_availability_is_fresh() {
        let response = get(app(Behaviour::Succeed), "/api/availability?force=1").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["source"], "fresh");
    }

    #[tokio::test]
    async fn forced_rebuild_failure_is_500_json() {
        let response = get(app(Behaviour::Fail), "/api/availability?force=yes").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "internal_error");
        assert!(json["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn handler_panic_is_caught_as_500_json() {
        let response = get(app(Behaviour::Panic), "/api/availability?force=1").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().contains_key("x-request-id"));
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "internal_error");
    }

    #[tokio::test]
    async fn dashboard_is_long_cached_html() {
        let response = get(app(Behaviour::Succeed), "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CACHE_CONTROL)
                .map(|v| v.as_bytes()),
            Some(&b"public, max-age=300, s-maxage=86400"[..])
        );
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/html"), "{content_type}");
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("/api/availability"));
    }
}
