//! Application services: the operations the adapters call.
//!
//! Services are generic over the repository traits; the wiring layer picks the
//! concrete backends.

mod customer_service;
mod voucher_service;

use thiserror::Error;

use voucherdesk_core::DomainError;

use crate::repository::RepositoryError;
use crate::snapshot::SnapshotError;

pub use customer_service::CustomerService;
pub use voucher_service::VoucherService;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
