//! Postgres-backed repositories (production profile).
//!
//! Every operation is a single SQL statement; atomicity of that statement is
//! left to the database. Reads rebuild entities fresh from rows, using the
//! `voucher_type` discriminator to pick the variant.
//!
//! ## Thread Safety
//!
//! Repositories are `Send + Sync` and cheap to clone; they share one SQLx
//! connection pool.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use voucherdesk_core::{CustomerId, VoucherId};
use voucherdesk_customers::Customer;
use voucherdesk_vouchers::{Voucher, VoucherType};

use super::error::map_sqlx_error;
use super::rows::{stored_id, CustomerRow, VoucherRow};
use super::{CustomerRepository, RepositoryError, VoucherRepository};

const VOUCHER_COLUMNS: &str = "id, voucher_type, value, created_at, customer_id";
const CUSTOMER_COLUMNS: &str = "id, name, email, created_at";

/// Postgres-backed voucher repository.
#[derive(Debug, Clone)]
pub struct PostgresVoucherRepository {
    pool: Arc<PgPool>,
}

impl PostgresVoucherRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    async fn fetch_where(
        &self,
        operation: &str,
        voucher_type: Option<VoucherType>,
    ) -> Result<Vec<Voucher>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {VOUCHER_COLUMNS} FROM vouchers \
             WHERE ($1::text IS NULL OR voucher_type = $1) \
             ORDER BY created_at ASC"
        ))
        .bind(voucher_type.map(VoucherType::as_str))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error(operation, e))?;

        rows.iter().map(decode_voucher).collect()
    }
}

#[async_trait]
impl VoucherRepository for PostgresVoucherRepository {
    #[instrument(skip(self), fields(voucher_id = %id), err)]
    async fn find_by_id(&self, id: VoucherId) -> Result<Option<Voucher>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_voucher_by_id", e))?;

        row.as_ref().map(decode_voucher).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_all(&self) -> Result<Vec<Voucher>, RepositoryError> {
        self.fetch_where("find_all_vouchers", None).await
    }

    #[instrument(skip(self), fields(voucher_type = %voucher_type), err)]
    async fn find_by_type(&self, voucher_type: VoucherType) -> Result<Vec<Voucher>, RepositoryError> {
        self.fetch_where("find_vouchers_by_type", Some(voucher_type)).await
    }

    #[instrument(skip(self, voucher), fields(voucher_type = %voucher.voucher_type()), err)]
    async fn insert(&self, mut voucher: Voucher) -> Result<Voucher, RepositoryError> {
        voucher.assign_id(VoucherId::new());

        sqlx::query(
            r#"
            INSERT INTO vouchers (
                id,
                voucher_type,
                value,
                created_at,
                customer_id
            )
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(stored_id(&voucher)?)
        .bind(voucher.voucher_type().as_str())
        .bind(voucher.value())
        .bind(voucher.created_at())
        .bind(voucher.customer_id().map(Uuid::from))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_voucher", e))?;

        Ok(voucher)
    }

    #[instrument(skip(self, voucher), fields(voucher_id = ?voucher.id_typed()), err)]
    async fn update(&self, voucher: &Voucher) -> Result<(), RepositoryError> {
        let id = stored_id(voucher)?;

        let result = sqlx::query(
            r#"
            UPDATE vouchers
            SET value = $2,
                customer_id = $3
            WHERE id = $1 AND voucher_type = $4 AND created_at = $5
            "#,
        )
        .bind(id)
        .bind(voucher.value())
        .bind(voucher.customer_id().map(Uuid::from))
        .bind(voucher.voucher_type().as_str())
        .bind(voucher.created_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_voucher", e))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let exists = sqlx::query("SELECT 1 FROM vouchers WHERE id = $1")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_voucher", e))?
            .is_some();
        if exists {
            return Err(RepositoryError::Conflict(format!(
                "voucher {id}: type or created_at differs from the stored record"
            )));
        }
        Err(RepositoryError::NotFound(format!("voucher {id}")))
    }

    #[instrument(skip(self), fields(voucher_id = %id), err)]
    async fn delete_by_id(&self, id: VoucherId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM vouchers WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_voucher", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn count(&self) -> Result<usize, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM vouchers")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_vouchers", e))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| RepositoryError::storage(format!("failed to read count: {e}")))?;
        Ok(total as usize)
    }
}

/// Postgres-backed customer repository.
#[derive(Debug, Clone)]
pub struct PostgresCustomerRepository {
    pool: Arc<PgPool>,
}

impl PostgresCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl CustomerRepository for PostgresCustomerRepository {
    #[instrument(skip(self), fields(customer_id = %id), err)]
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_customer_by_id", e))?;

        row.as_ref().map(decode_customer).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = $1"))
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_customer_by_email", e))?;

        row.as_ref().map(decode_customer).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY created_at ASC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_all_customers", e))?;

        rows.iter().map(decode_customer).collect()
    }

    #[instrument(skip(self, customer), fields(customer_id = %customer.id_typed()), err)]
    async fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, email, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(customer.id_typed().as_uuid())
        .bind(customer.name())
        .bind(customer.email())
        .bind(customer.created_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_customer", e))?;

        Ok(customer)
    }

    #[instrument(skip(self), fields(customer_id = %id), err)]
    async fn delete_by_id(&self, id: CustomerId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_customer", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn count(&self) -> Result<usize, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM customers")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_customers", e))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| RepositoryError::storage(format!("failed to read count: {e}")))?;
        Ok(total as usize)
    }
}

// SQLx row types

impl<'r> FromRow<'r, PgRow> for VoucherRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(VoucherRow {
            id: row.try_get("id")?,
            voucher_type: row.try_get("voucher_type")?,
            value: row.try_get("value")?,
            created_at: row.try_get("created_at")?,
            customer_id: row.try_get("customer_id")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CustomerRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CustomerRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

fn decode_voucher(row: &PgRow) -> Result<Voucher, RepositoryError> {
    VoucherRow::from_row(row)
        .map_err(|e| RepositoryError::storage(format!("failed to deserialize voucher row: {e}")))?
        .try_into()
}

fn decode_customer(row: &PgRow) -> Result<Customer, RepositoryError> {
    CustomerRow::from_row(row)
        .map_err(|e| RepositoryError::storage(format!("failed to deserialize customer row: {e}")))?
        .try_into()
}
