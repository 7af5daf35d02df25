use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use voucherdesk_core::{CustomerId, DomainError, DomainResult, Entity, timestamp_now};

/// Entity: Customer (a voucher owner).
///
/// Vouchers reference customers by [`CustomerId`] only; nothing in this type
/// knows about vouchers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CustomerRecord")]
pub struct Customer {
    id: CustomerId,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl Customer {
    /// Rebuild a customer from known parts (storage rows, imports, tests).
    pub fn new(
        id: CustomerId,
        name: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let email = email.into();
        validate_name(&name)?;
        validate_email(&email)?;

        Ok(Self {
            id,
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            created_at,
        })
    }

    /// Register a brand new customer with a fresh identifier.
    pub fn register(name: impl Into<String>, email: impl Into<String>) -> DomainResult<Self> {
        Self::new(CustomerId::new(), name, email, timestamp_now())
    }

    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Unchecked wire shape; deserialization goes through [`Customer::new`].
#[derive(Deserialize)]
struct CustomerRecord {
    id: CustomerId,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CustomerRecord> for Customer {
    type Error = DomainError;

    fn try_from(r: CustomerRecord) -> Result<Self, Self::Error> {
        Customer::new(r.id, r.name, r.email, r.created_at)
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> Option<Self::Id> {
        Some(self.id)
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(())
}

fn validate_email(email: &str) -> DomainResult<()> {
    let email = email.trim();
    let mut parts = email.split('@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();

    if local.is_empty() || domain.is_empty() || parts.next().is_some() {
        return Err(DomainError::validation(format!("invalid email address: '{email}'")));
    }
    Ok(())
}
