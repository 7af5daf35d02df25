use std::collections::HashMap;
use std::path::Path;

use tracing::{info, instrument};

use voucherdesk_core::{CustomerId, DomainError, VoucherId};
use voucherdesk_vouchers::{Voucher, VoucherType};

use super::{ServiceError, ServiceResult};
use crate::repository::{CustomerRepository, VoucherRepository};
use crate::snapshot;

/// Voucher use cases over a voucher store and a customer store.
#[derive(Debug, Clone)]
pub struct VoucherService<V, C> {
    vouchers: V,
    customers: C,
}

impl<V, C> VoucherService<V, C>
where
    V: VoucherRepository,
    C: CustomerRepository,
{
    pub fn new(vouchers: V, customers: C) -> Self {
        Self { vouchers, customers }
    }

    /// Create and store a voucher from raw user input.
    #[instrument(skip(self), err)]
    pub async fn create_voucher(&self, voucher_type: VoucherType, amount: &str) -> ServiceResult<Voucher> {
        let value: i64 = amount
            .trim()
            .parse()
            .map_err(|_| DomainError::validation(format!("amount '{}' is not a whole number", amount.trim())))?;

        let voucher = Voucher::issue(voucher_type, value)?;
        let stored = self.vouchers.insert(voucher).await?;
        info!(voucher_id = ?stored.id_typed(), "voucher created");
        Ok(stored)
    }

    pub async fn get_voucher_list(&self) -> ServiceResult<HashMap<VoucherId, Voucher>> {
        Ok(self
            .vouchers
            .find_all()
            .await?
            .into_iter()
            .filter_map(|v| v.id_typed().map(|id| (id, v)))
            .collect())
    }

    pub async fn get_all_vouchers(&self) -> ServiceResult<Vec<Voucher>> {
        Ok(self.vouchers.find_all().await?)
    }

    #[instrument(skip(self, voucher), fields(voucher_type = %voucher.voucher_type()), err)]
    pub async fn insert_voucher(&self, voucher: Voucher) -> ServiceResult<Voucher> {
        Ok(self.vouchers.insert(voucher).await?)
    }

    pub async fn get_voucher(&self, id: VoucherId) -> ServiceResult<Voucher> {
        self.vouchers
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("voucher", id))
    }

    #[instrument(skip(self), err)]
    pub async fn remove_voucher_by_id(&self, id: VoucherId) -> ServiceResult<()> {
        Ok(self.vouchers.delete_by_id(id).await?)
    }

    /// Assign the voucher to an existing customer.
    #[instrument(skip(self), err)]
    pub async fn change_owner(&self, voucher_id: VoucherId, customer_id: CustomerId) -> ServiceResult<Voucher> {
        let mut voucher = self.get_voucher(voucher_id).await?;
        let customer = self
            .customers
            .find_by_id(customer_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("customer", customer_id))?;

        voucher.change_owner(&customer);
        self.vouchers.update(&voucher).await?;
        Ok(voucher)
    }

    #[instrument(skip(self), err)]
    pub async fn revoke_owner(&self, voucher_id: VoucherId) -> ServiceResult<Voucher> {
        let mut voucher = self.get_voucher(voucher_id).await?;
        voucher.revoke_owner();
        self.vouchers.update(&voucher).await?;
        Ok(voucher)
    }

    #[instrument(skip(self), err)]
    pub async fn change_value(&self, voucher_id: VoucherId, value: i64) -> ServiceResult<Voucher> {
        let mut voucher = self.get_voucher(voucher_id).await?;
        voucher.change_value(value)?;
        self.vouchers.update(&voucher).await?;
        Ok(voucher)
    }

    pub async fn find_by_type(&self, voucher_type: VoucherType) -> ServiceResult<Vec<Voucher>> {
        Ok(self.vouchers.find_by_type(voucher_type).await?)
    }

    pub async fn count(&self) -> ServiceResult<usize> {
        Ok(self.vouchers.count().await?)
    }

    /// Write every stored voucher to `path`. Returns how many were written.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()), err)]
    pub async fn export_snapshot(&self, path: impl AsRef<Path>) -> ServiceResult<usize> {
        let vouchers = self.vouchers.find_all().await?;
        snapshot::write_vouchers(path, &vouchers)?;
        Ok(vouchers.len())
    }

    /// Store the vouchers found in `path`, skipping ids that are already
    /// stored. Returns how many were imported.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()), err)]
    pub async fn import_snapshot(&self, path: impl AsRef<Path>) -> ServiceResult<usize> {
        let mut imported = 0;
        for voucher in snapshot::read_vouchers(path)? {
            if let Some(id) = voucher.id_typed() {
                if self.vouchers.find_by_id(id).await?.is_some() {
                    continue;
                }
            }
            self.vouchers.insert(voucher).await?;
            imported += 1;
        }
        info!(imported, "voucher snapshot imported");
        Ok(imported)
    }
}
