//! Storage row shapes shared by the relational backends.
//!
//! Rows are decoded into these plain structs first and then rebuilt into domain
//! entities, so a row with a bad discriminator or an out-of-range value surfaces
//! as a `Storage` error instead of a half-built entity.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use voucherdesk_core::{CustomerId, VoucherId};
use voucherdesk_customers::Customer;
use voucherdesk_vouchers::{Voucher, VoucherType};

use super::RepositoryError;

#[derive(Debug)]
pub(crate) struct VoucherRow {
    pub id: Uuid,
    pub voucher_type: String,
    pub value: i64,
    pub created_at: DateTime<Utc>,
    pub customer_id: Option<Uuid>,
}

impl TryFrom<VoucherRow> for Voucher {
    type Error = RepositoryError;

    fn try_from(row: VoucherRow) -> Result<Self, Self::Error> {
        let voucher_type: VoucherType = row.voucher_type.parse().map_err(|e| {
            RepositoryError::storage(format!("voucher {} has a bad discriminator: {e}", row.id))
        })?;

        Voucher::with_owner(
            voucher_type,
            Some(VoucherId::from_uuid(row.id)),
            row.customer_id.map(CustomerId::from_uuid),
            row.value,
            row.created_at,
        )
        .map_err(|e| RepositoryError::storage(format!("voucher {} failed validation: {e}", row.id)))
    }
}

#[derive(Debug)]
pub(crate) struct CustomerRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        Customer::new(CustomerId::from_uuid(row.id), row.name, row.email, row.created_at)
            .map_err(|e| RepositoryError::storage(format!("customer {} failed validation: {e}", row.id)))
    }
}

/// Persisted id of a voucher that is about to be written.
pub(crate) fn stored_id(voucher: &Voucher) -> Result<Uuid, RepositoryError> {
    voucher
        .id_typed()
        .map(Uuid::from)
        .ok_or(RepositoryError::MissingId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voucherdesk_core::timestamp_now;

    fn row(voucher_type: &str, value: i64) -> VoucherRow {
        VoucherRow {
            id: Uuid::new_v4(),
            voucher_type: voucher_type.to_string(),
            value,
            created_at: timestamp_now(),
            customer_id: Some(Uuid::new_v4()),
        }
    }

    #[test]
    fn discriminator_selects_the_variant() {
        let voucher = Voucher::try_from(row("percent_discount", 30)).unwrap();
        assert_eq!(voucher.voucher_type(), VoucherType::PercentDiscount);
        assert!(voucher.customer_id().is_some());

        let voucher = Voucher::try_from(row("fixed_amount", 30_000)).unwrap();
        assert_eq!(voucher.voucher_type(), VoucherType::FixedAmount);
    }

    #[test]
    fn bad_rows_become_storage_errors() {
        assert!(matches!(
            Voucher::try_from(row("gift_card", 10)),
            Err(RepositoryError::Storage(_))
        ));
        assert!(matches!(
            Voucher::try_from(row("percent_discount", 500)),
            Err(RepositoryError::Storage(_))
        ));
    }
}
