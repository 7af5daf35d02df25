use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use voucherdesk_core::{CustomerId, DomainError, DomainResult, Entity, VoucherId, timestamp_now};
use voucherdesk_customers::Customer;

/// Voucher variant.
///
/// The variant decides the accepted value range; it is fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherType {
    /// Discount of a fixed amount, `1..=1_000_000`.
    FixedAmount,
    /// Discount of a percentage, `1..=100`.
    PercentDiscount,
}

impl VoucherType {
    pub const ALL: [VoucherType; 2] = [VoucherType::FixedAmount, VoucherType::PercentDiscount];

    /// Largest value (inclusive) this variant accepts.
    pub const fn max_value(self) -> i64 {
        match self {
            VoucherType::FixedAmount => 1_000_000,
            VoucherType::PercentDiscount => 100,
        }
    }

    /// Discriminator stored in the relational `voucher_type` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            VoucherType::FixedAmount => "fixed_amount",
            VoucherType::PercentDiscount => "percent_discount",
        }
    }

    /// Tag used in the line-oriented file form.
    pub const fn file_tag(self) -> &'static str {
        match self {
            VoucherType::FixedAmount => "FixedAmount",
            VoucherType::PercentDiscount => "PercentDiscount",
        }
    }

    /// Check `value` against this variant's range.
    pub fn validate(self, value: i64) -> DomainResult<()> {
        let what = match self {
            VoucherType::FixedAmount => "fixed amount",
            VoucherType::PercentDiscount => "percent discount",
        };

        if value < 0 {
            return Err(DomainError::value_range(format!("{what} should be positive (got {value})")));
        }
        if value == 0 {
            return Err(DomainError::value_range(format!("{what} shouldn't be zero")));
        }
        if value > self.max_value() {
            return Err(DomainError::value_range(format!(
                "{what} should be at most {} (got {value})",
                self.max_value()
            )));
        }
        Ok(())
    }
}

impl core::fmt::Display for VoucherType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoucherType {
    type Err = DomainError;

    /// Accepts the discriminator, the file tag, and the short forms `fixed` / `percent`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "fixed_amount" | "fixedamount" | "fixed" => Ok(VoucherType::FixedAmount),
            "percent_discount" | "percentdiscount" | "percent" => Ok(VoucherType::PercentDiscount),
            _ => Err(DomainError::validation(format!(
                "unknown voucher type '{}' (expected fixed_amount or percent_discount)",
                s.trim()
            ))),
        }
    }
}

/// Entity: Voucher.
///
/// `value` satisfies the variant's range in every observable state: constructors
/// and [`Voucher::change_value`] validate before assigning anything.
///
/// `customer_id` is a weak reference; the voucher never owns or loads the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VoucherRecord")]
pub struct Voucher {
    id: Option<VoucherId>,
    voucher_type: VoucherType,
    value: i64,
    created_at: DateTime<Utc>,
    customer_id: Option<CustomerId>,
}

impl Voucher {
    /// Build a voucher without an owner.
    pub fn new(
        voucher_type: VoucherType,
        id: Option<VoucherId>,
        value: i64,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Self::with_owner(voucher_type, id, None, value, created_at)
    }

    /// Build a voucher with an optional owner (e.g. when rebuilding from storage).
    pub fn with_owner(
        voucher_type: VoucherType,
        id: Option<VoucherId>,
        customer_id: Option<CustomerId>,
        value: i64,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        voucher_type.validate(value)?;

        Ok(Self {
            id,
            voucher_type,
            value,
            created_at,
            customer_id,
        })
    }

    pub fn fixed_amount(id: Option<VoucherId>, amount: i64, created_at: DateTime<Utc>) -> DomainResult<Self> {
        Self::new(VoucherType::FixedAmount, id, amount, created_at)
    }

    pub fn percent_discount(id: Option<VoucherId>, percent: i64, created_at: DateTime<Utc>) -> DomainResult<Self> {
        Self::new(VoucherType::PercentDiscount, id, percent, created_at)
    }

    /// A fresh, unsaved voucher stamped with the current time.
    pub fn issue(voucher_type: VoucherType, value: i64) -> DomainResult<Self> {
        Self::new(voucher_type, None, value, timestamp_now())
    }

    pub fn id_typed(&self) -> Option<VoucherId> {
        self.id
    }

    pub fn voucher_type(&self) -> VoucherType {
        self.voucher_type
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    /// Replace the value; on failure the voucher is left untouched.
    pub fn change_value(&mut self, value: i64) -> DomainResult<()> {
        self.voucher_type.validate(value)?;
        self.value = value;
        Ok(())
    }

    pub fn change_owner(&mut self, customer: &Customer) {
        self.customer_id = Some(customer.id_typed());
    }

    /// Existence of the customer is the caller's responsibility.
    pub fn change_owner_by_id(&mut self, customer_id: CustomerId) {
        self.customer_id = Some(customer_id);
    }

    pub fn revoke_owner(&mut self) {
        self.customer_id = None;
    }

    /// Give the voucher its identity. An already assigned id is kept.
    ///
    /// Returns the identifier in effect afterwards.
    pub fn assign_id(&mut self, id: VoucherId) -> VoucherId {
        *self.id.get_or_insert(id)
    }
}

/// Unchecked wire shape; deserialization goes through [`Voucher::with_owner`].
#[derive(Deserialize)]
struct VoucherRecord {
    id: Option<VoucherId>,
    voucher_type: VoucherType,
    value: i64,
    created_at: DateTime<Utc>,
    customer_id: Option<CustomerId>,
}

impl TryFrom<VoucherRecord> for Voucher {
    type Error = DomainError;

    fn try_from(r: VoucherRecord) -> Result<Self, Self::Error> {
        Voucher::with_owner(r.voucher_type, r.id, r.customer_id, r.value, r.created_at)
    }
}

impl Entity for Voucher {
    type Id = VoucherId;

    fn id(&self) -> Option<Self::Id> {
        self.id
    }
}
