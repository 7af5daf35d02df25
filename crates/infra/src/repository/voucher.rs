use std::sync::Arc;

use async_trait::async_trait;

use voucherdesk_core::VoucherId;
use voucherdesk_vouchers::{Voucher, VoucherType};

use super::RepositoryError;

/// Voucher persistence boundary.
///
/// ## Contract (identical across implementations)
///
/// - `find_by_id` returns `Ok(None)` for an unknown id, never an error.
/// - `find_all` order is storage-defined.
/// - `insert` assigns a random id when the voucher has none and keeps an existing
///   one; the returned voucher always carries its id. Inserting an id that is
///   already stored fails with `Conflict`.
/// - `update` overwrites `value` and `customer_id` (including clearing it) of the
///   stored record. An unknown id fails with `NotFound`; a voucher without id
///   fails with `MissingId`.
/// - `delete_by_id` is a no-op for an unknown id.
#[async_trait]
pub trait VoucherRepository: Send + Sync {
    async fn find_by_id(&self, id: VoucherId) -> Result<Option<Voucher>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<Voucher>, RepositoryError>;

    async fn find_by_type(&self, voucher_type: VoucherType) -> Result<Vec<Voucher>, RepositoryError>;

    async fn insert(&self, voucher: Voucher) -> Result<Voucher, RepositoryError>;

    async fn update(&self, voucher: &Voucher) -> Result<(), RepositoryError>;

    async fn delete_by_id(&self, id: VoucherId) -> Result<(), RepositoryError>;

    async fn count(&self) -> Result<usize, RepositoryError>;
}

#[async_trait]
impl<S> VoucherRepository for Arc<S>
where
    S: VoucherRepository + ?Sized,
{
    async fn find_by_id(&self, id: VoucherId) -> Result<Option<Voucher>, RepositoryError> {
        (**self).find_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Voucher>, RepositoryError> {
        (**self).find_all().await
    }

    async fn find_by_type(&self, voucher_type: VoucherType) -> Result<Vec<Voucher>, RepositoryError> {
        (**self).find_by_type(voucher_type).await
    }

    async fn insert(&self, voucher: Voucher) -> Result<Voucher, RepositoryError> {
        (**self).insert(voucher).await
    }

    async fn update(&self, voucher: &Voucher) -> Result<(), RepositoryError> {
        (**self).update(voucher).await
    }

    async fn delete_by_id(&self, id: VoucherId) -> Result<(), RepositoryError> {
        (**self).delete_by_id(id).await
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        (**self).count().await
    }
}
