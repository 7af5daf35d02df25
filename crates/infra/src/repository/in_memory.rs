use async_trait::async_trait;
use tracing::debug;

use voucherdesk_core::{CustomerId, VoucherId};
use voucherdesk_customers::Customer;
use voucherdesk_vouchers::{Voucher, VoucherType};

use super::memory_table::MemoryTable;
use super::{CustomerRepository, RepositoryError, VoucherRepository};

/// In-memory voucher repository (dev profile, tests).
///
/// Not durable. Safe to share across request handlers.
#[derive(Debug, Default)]
pub struct InMemoryVoucherRepository {
    table: MemoryTable<Voucher>,
}

impl InMemoryVoucherRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VoucherRepository for InMemoryVoucherRepository {
    async fn find_by_id(&self, id: VoucherId) -> Result<Option<Voucher>, RepositoryError> {
        self.table.get(&id)
    }

    async fn find_all(&self) -> Result<Vec<Voucher>, RepositoryError> {
        self.table.list()
    }

    async fn find_by_type(&self, voucher_type: VoucherType) -> Result<Vec<Voucher>, RepositoryError> {
        self.table.filter(|v| v.voucher_type() == voucher_type)
    }

    async fn insert(&self, voucher: Voucher) -> Result<Voucher, RepositoryError> {
        let stored = self
            .table
            .insert_new(voucher, |v| v.assign_id(VoucherId::new()), |_, _| None)?;
        debug!(voucher_id = ?stored.id_typed(), voucher_type = %stored.voucher_type(), "voucher inserted");
        Ok(stored)
    }

    async fn update(&self, voucher: &Voucher) -> Result<(), RepositoryError> {
        self.table.replace(voucher, |stored, next| {
            let unchanged = stored.voucher_type() == next.voucher_type() && stored.created_at() == next.created_at();
            (!unchanged).then(|| format!("voucher {:?}: type or created_at differs from the stored record", next.id_typed()))
        })
    }

    async fn delete_by_id(&self, id: VoucherId) -> Result<(), RepositoryError> {
        if self.table.remove(&id)?.is_some() {
            debug!(voucher_id = %id, "voucher deleted");
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        self.table.len()
    }
}

/// In-memory customer repository (dev profile, tests).
#[derive(Debug, Default)]
pub struct InMemoryCustomerRepository {
    table: MemoryTable<Customer>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        self.table.get(&id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, RepositoryError> {
        self.table.find_first(|c| c.email() == email)
    }

    async fn find_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        self.table.list()
    }

    async fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        self.table.insert_new(
            customer,
            |c| c.id_typed(),
            |existing, new| {
                (existing.email() == new.email())
                    .then(|| format!("email '{}' is already registered", new.email()))
            },
        )
    }

    async fn delete_by_id(&self, id: CustomerId) -> Result<(), RepositoryError> {
        self.table.remove(&id)?;
        Ok(())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use voucherdesk_core::timestamp_now;

    fn fixed(value: i64) -> Voucher {
        Voucher::fixed_amount(Some(VoucherId::new()), value, timestamp_now()).unwrap()
    }

    fn percent(value: i64) -> Voucher {
        Voucher::percent_discount(Some(VoucherId::new()), value, timestamp_now()).unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_missing_id_and_keeps_existing_one() {
        let repo = InMemoryVoucherRepository::new();

        let unsaved = Voucher::issue(VoucherType::FixedAmount, 100).unwrap();
        let stored = repo.insert(unsaved).await.unwrap();
        let assigned = stored.id_typed().expect("id assigned on insert");

        let given = fixed(200);
        let kept = repo.insert(given.clone()).await.unwrap();
        assert_eq!(kept.id_typed(), given.id_typed());

        let found = repo.find_by_id(assigned).await.unwrap().unwrap();
        assert_eq!(found.value(), 100);
        assert_eq!(found.voucher_type(), VoucherType::FixedAmount);
        assert_eq!(found.created_at(), stored.created_at());
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_id() {
        let repo = InMemoryVoucherRepository::new();
        let voucher = fixed(5000);

        repo.insert(voucher.clone()).await.unwrap();
        let err = repo.insert(voucher).await.unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_unknown_id() {
        let repo = InMemoryVoucherRepository::new();
        assert_eq!(repo.find_by_id(VoucherId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn find_by_type_and_count() {
        let repo = InMemoryVoucherRepository::new();
        let fixed = repo.insert(fixed(5000)).await.unwrap();

        let fixed_only = repo.find_by_type(VoucherType::FixedAmount).await.unwrap();
        assert_eq!(fixed_only, vec![fixed]);
        assert!(repo.find_by_type(VoucherType::PercentDiscount).await.unwrap().is_empty());

        repo.insert(percent(50)).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
        assert_eq!(repo.find_by_type(VoucherType::PercentDiscount).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_overwrites_value_and_owner() {
        let repo = InMemoryVoucherRepository::new();
        let mut voucher = repo.insert(fixed(5000)).await.unwrap();
        let id = voucher.id_typed().unwrap();

        voucher.change_value(8000).unwrap();
        let owner = CustomerId::new();
        voucher.change_owner_by_id(owner);
        repo.update(&voucher).await.unwrap();

        let reloaded = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(reloaded.value(), 8000);
        assert_eq!(reloaded.customer_id(), Some(owner));

        voucher.revoke_owner();
        repo.update(&voucher).await.unwrap();
        let reloaded = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(reloaded.customer_id(), None);
    }

    #[tokio::test]
    async fn update_of_unknown_or_unsaved_voucher_fails() {
        let repo = InMemoryVoucherRepository::new();

        let err = repo.update(&fixed(10)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));

        let unsaved = Voucher::issue(VoucherType::FixedAmount, 10).unwrap();
        assert_eq!(repo.update(&unsaved).await.unwrap_err(), RepositoryError::MissingId);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_cannot_change_type_or_creation_time() {
        let repo = InMemoryVoucherRepository::new();
        let stored = repo.insert(percent(50)).await.unwrap();
        let id = stored.id_typed();

        let retyped = Voucher::fixed_amount(id, 8000, stored.created_at()).unwrap();
        let err = repo.update(&retyped).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let redated = Voucher::percent_discount(id, 20, stored.created_at() + chrono::Duration::hours(1)).unwrap();
        let err = repo.update(&redated).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        assert_eq!(repo.find_by_id(id.unwrap()).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn handed_out_vouchers_are_copies() {
        let repo = InMemoryVoucherRepository::new();
        let stored = repo.insert(fixed(5000)).await.unwrap();
        let id = stored.id_typed().unwrap();

        let mut copy = repo.find_by_id(id).await.unwrap().unwrap();
        copy.change_value(1).unwrap();

        assert_eq!(repo.find_by_id(id).await.unwrap().unwrap().value(), 5000);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let repo = InMemoryVoucherRepository::new();
        let a = repo.insert(fixed(5000)).await.unwrap().id_typed().unwrap();
        let b = repo.insert(percent(50)).await.unwrap().id_typed().unwrap();

        repo.delete_by_id(a).await.unwrap();
        repo.delete_by_id(b).await.unwrap();
        repo.delete_by_id(b).await.unwrap();

        assert!(repo.find_all().await.unwrap().is_empty());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_are_all_kept() {
        let repo = Arc::new(InMemoryVoucherRepository::new());

        let handles: Vec<_> = (1..=64)
            .map(|value| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.insert(Voucher::issue(VoucherType::FixedAmount, value).unwrap())
                        .await
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(repo.count().await.unwrap(), 64);
    }

    #[tokio::test]
    async fn customer_insert_rejects_duplicate_email() {
        let repo = InMemoryCustomerRepository::new();
        let customer = Customer::register("test", "test@mail.com").unwrap();
        repo.insert(customer.clone()).await.unwrap();

        let twin = Customer::register("other", "test@mail.com").unwrap();
        let err = repo.insert(twin).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        assert_eq!(
            repo.find_by_email("test@mail.com").await.unwrap(),
            Some(customer.clone())
        );
        assert_eq!(repo.find_by_id(customer.id_typed()).await.unwrap(), Some(customer));
    }

    #[tokio::test]
    async fn customer_delete_and_count() {
        let repo = InMemoryCustomerRepository::new();
        let a = repo.insert(Customer::register("a", "a@mail.com").unwrap()).await.unwrap();
        repo.insert(Customer::register("b", "b@mail.com").unwrap()).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);

        repo.delete_by_id(a.id_typed()).await.unwrap();
        repo.delete_by_id(a.id_typed()).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }
}
