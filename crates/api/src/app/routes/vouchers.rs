use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use voucherdesk_core::{CustomerId, VoucherId};
use voucherdesk_infra::Services;
use voucherdesk_vouchers::Voucher;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_vouchers).post(create_voucher))
        .route("/:id", get(get_voucher).delete(delete_voucher))
        .route("/:id/owner", post(change_owner).delete(revoke_owner))
}

pub async fn list_vouchers(Extension(services): Extension<Arc<Services>>) -> axum::response::Response {
    match services.vouchers.get_all_vouchers().await {
        Ok(vouchers) => {
            let items = vouchers.iter().map(dto::voucher_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_voucher(
    Extension(services): Extension<Arc<Services>>,
    Json(body): Json<dto::CreateVoucherRequest>,
) -> axum::response::Response {
    let mut voucher = match Voucher::issue(body.voucher_type, body.value) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Some(raw) = body.customer_id.as_deref() {
        let customer_id: CustomerId = match errors::parse_id(raw) {
            Ok(id) => id,
            Err(resp) => return resp,
        };
        let customer = match services.customers.get_customer_by_id(customer_id).await {
            Ok(c) => c,
            Err(e) => return errors::service_error_to_response(e),
        };
        voucher.change_owner(&customer);
    }

    match services.vouchers.insert_voucher(voucher).await {
        Ok(stored) => (StatusCode::CREATED, Json(dto::voucher_to_json(&stored))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_voucher(
    Extension(services): Extension<Arc<Services>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: VoucherId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.vouchers.get_voucher(id).await {
        Ok(v) => (StatusCode::OK, Json(dto::voucher_to_json(&v))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_voucher(
    Extension(services): Extension<Arc<Services>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: VoucherId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.vouchers.remove_voucher_by_id(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn change_owner(
    Extension(services): Extension<Arc<Services>>,
    Path(id): Path<String>,
    Json(body): Json<dto::ChangeOwnerRequest>,
) -> axum::response::Response {
    let id: VoucherId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let customer_id: CustomerId = match errors::parse_id(&body.customer_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.vouchers.change_owner(id, customer_id).await {
        Ok(v) => (StatusCode::OK, Json(dto::voucher_to_json(&v))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn revoke_owner(
    Extension(services): Extension<Arc<Services>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: VoucherId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.vouchers.revoke_owner(id).await {
        Ok(v) => (StatusCode::OK, Json(dto::voucher_to_json(&v))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
