use axum::Router;

pub mod customers;
pub mod system;
pub mod vouchers;

/// Router for all resource endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/vouchers", vouchers::router())
        .nest("/customers", customers::router())
}
