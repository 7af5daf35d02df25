use std::sync::Arc;

use async_trait::async_trait;

use voucherdesk_core::CustomerId;
use voucherdesk_customers::Customer;

use super::RepositoryError;

/// Customer persistence boundary.
///
/// Customers always carry their id. Inserting a duplicate id or a duplicate
/// email fails with `Conflict`; `delete_by_id` is a no-op for an unknown id.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<Customer>, RepositoryError>;

    async fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError>;

    async fn delete_by_id(&self, id: CustomerId) -> Result<(), RepositoryError>;

    async fn count(&self) -> Result<usize, RepositoryError>;
}

#[async_trait]
impl<S> CustomerRepository for Arc<S>
where
    S: CustomerRepository + ?Sized,
{
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, RepositoryError> {
        (**self).find_by_email(email).await
    }

    async fn find_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        (**self).find_all().await
    }

    async fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        (**self).insert(customer).await
    }

    async fn delete_by_id(&self, id: CustomerId) -> Result<(), RepositoryError> {
        (**self).delete_by_id(id).await
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        (**self).count().await
    }
}
