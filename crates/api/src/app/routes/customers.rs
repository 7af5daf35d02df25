use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use voucherdesk_core::CustomerId;
use voucherdesk_infra::Services;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_customers).post(register_customer))
        .route("/:id", get(get_customer))
}

pub async fn register_customer(
    Extension(services): Extension<Arc<Services>>,
    Json(body): Json<dto::RegisterCustomerRequest>,
) -> axum::response::Response {
    match services.customers.register_customer(&body.name, &body.email).await {
        Ok(c) => (StatusCode::CREATED, Json(dto::customer_to_json(&c))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_customers(Extension(services): Extension<Arc<Services>>) -> axum::response::Response {
    match services.customers.get_all_customers().await {
        Ok(customers) => {
            let items = customers.iter().map(dto::customer_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_customer(
    Extension(services): Extension<Arc<Services>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CustomerId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.customers.get_customer_by_id(id).await {
        Ok(c) => (StatusCode::OK, Json(dto::customer_to_json(&c))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
