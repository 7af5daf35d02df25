//! HTTP API application wiring (Axum router + services).
//!
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use voucherdesk_infra::Services;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Services) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(ServiceBuilder::new().layer(Extension(Arc::new(services))))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app.oneshot(request).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn unknown_customer_is_404() {
        let app = build_app(Services::in_memory());
        let request = Request::get(format!("/customers/{}", voucherdesk_core::CustomerId::new()))
            .body(Body::empty())
            .unwrap();

        let (status, body) = call(app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn invalid_customer_email_is_400() {
        let app = build_app(Services::in_memory());
        let request = Request::post("/customers")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"x","email":"no-at-sign"}"#))
            .unwrap();

        let (status, body) = call(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn owner_change_for_unknown_voucher_is_404() {
        let app = build_app(Services::in_memory());
        let uri = format!("/vouchers/{}/owner", voucherdesk_core::VoucherId::new());
        let payload = format!(r#"{{"customer_id":"{}"}}"#, voucherdesk_core::CustomerId::new());
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(payload))
            .unwrap();

        let (status, _) = call(app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
