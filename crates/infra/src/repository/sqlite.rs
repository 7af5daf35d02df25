//! SQLite-backed repositories (test profile, local single-file databases).
//!
//! Identifiers are stored as TEXT and timestamps as RFC 3339 TEXT, the same
//! layout the rest of the SQLite tooling reads without custom codecs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::instrument;
use uuid::Uuid;

use voucherdesk_core::{CustomerId, VoucherId};
use voucherdesk_customers::Customer;
use voucherdesk_vouchers::{Voucher, VoucherType};

use super::error::map_sqlx_error;
use super::rows::{stored_id, CustomerRow, VoucherRow};
use super::{CustomerRepository, RepositoryError, VoucherRepository};

/// SQLite-backed voucher repository.
#[derive(Debug, Clone)]
pub struct SqliteVoucherRepository {
    pool: SqlitePool,
}

impl SqliteVoucherRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VoucherRepository for SqliteVoucherRepository {
    #[instrument(skip(self), fields(voucher_id = %id), err)]
    async fn find_by_id(&self, id: VoucherId) -> Result<Option<Voucher>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, voucher_type, value, created_at, customer_id
            FROM vouchers
            WHERE id = ?1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_voucher_by_id", e))?;

        row.as_ref().map(decode_voucher).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_all(&self) -> Result<Vec<Voucher>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, voucher_type, value, created_at, customer_id
            FROM vouchers
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_all_vouchers", e))?;

        rows.iter().map(decode_voucher).collect()
    }

    #[instrument(skip(self), fields(voucher_type = %voucher_type), err)]
    async fn find_by_type(&self, voucher_type: VoucherType) -> Result<Vec<Voucher>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, voucher_type, value, created_at, customer_id
            FROM vouchers
            WHERE voucher_type = ?1
            ORDER BY created_at ASC
            "#,
        )
        .bind(voucher_type.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_vouchers_by_type", e))?;

        rows.iter().map(decode_voucher).collect()
    }

    #[instrument(skip(self, voucher), fields(voucher_type = %voucher.voucher_type()), err)]
    async fn insert(&self, mut voucher: Voucher) -> Result<Voucher, RepositoryError> {
        voucher.assign_id(VoucherId::new());

        sqlx::query(
            r#"
            INSERT INTO vouchers (id, voucher_type, value, created_at, customer_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(stored_id(&voucher)?.to_string())
        .bind(voucher.voucher_type().as_str())
        .bind(voucher.value())
        .bind(voucher.created_at().to_rfc3339())
        .bind(voucher.customer_id().map(|c| c.to_string()))
        .execute(&self.pool)
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
            SET value = ?2,
                customer_id = ?3
            WHERE id = ?1 AND voucher_type = ?4 AND created_at = ?5
            "#,
        )
        .bind(id.to_string())
        .bind(voucher.value())
        .bind(voucher.customer_id().map(|c| c.to_string()))
        .bind(voucher.voucher_type().as_str())
        .bind(voucher.created_at().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_voucher", e))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let exists = sqlx::query("SELECT 1 FROM vouchers WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
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
        sqlx::query("DELETE FROM vouchers WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_voucher", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn count(&self) -> Result<usize, RepositoryError> {
        count_rows(&self.pool, "SELECT COUNT(*) AS total FROM vouchers", "count_vouchers").await
    }
}

/// SQLite-backed customer repository.
#[derive(Debug, Clone)]
pub struct SqliteCustomerRepository {
    pool: SqlitePool,
}

impl SqliteCustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for SqliteCustomerRepository {
    #[instrument(skip(self), fields(customer_id = %id), err)]
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, email, created_at FROM customers WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_customer_by_id", e))?;

        row.as_ref().map(decode_customer).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, email, created_at FROM customers WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_customer_by_email", e))?;

        row.as_ref().map(decode_customer).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query("SELECT id, name, email, created_at FROM customers ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_all_customers", e))?;

        rows.iter().map(decode_customer).collect()
    }

    #[instrument(skip(self, customer), fields(customer_id = %customer.id_typed()), err)]
    async fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, email, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(customer.id_typed().to_string())
        .bind(customer.name())
        .bind(customer.email())
        .bind(customer.created_at().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_customer", e))?;

        Ok(customer)
    }

    #[instrument(skip(self), fields(customer_id = %id), err)]
    async fn delete_by_id(&self, id: CustomerId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_customer", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn count(&self) -> Result<usize, RepositoryError> {
        count_rows(&self.pool, "SELECT COUNT(*) AS total FROM customers", "count_customers").await
    }
}

async fn count_rows(pool: &SqlitePool, sql: &str, operation: &str) -> Result<usize, RepositoryError> {
    let row = sqlx::query(sql)
        .fetch_one(pool)
        .await
        .map_err(|e| map_sqlx_error(operation, e))?;

    let total: i64 = row
        .try_get("total")
        .map_err(|e| RepositoryError::storage(format!("failed to read count: {e}")))?;
    Ok(total as usize)
}

fn decode_voucher(row: &SqliteRow) -> Result<Voucher, RepositoryError> {
    let read = |e: sqlx::Error| RepositoryError::storage(format!("failed to deserialize voucher row: {e}"));

    let id: String = row.try_get("id").map_err(read)?;
    let customer_id: Option<String> = row.try_get("customer_id").map_err(read)?;
    let created_at: String = row.try_get("created_at").map_err(read)?;

    VoucherRow {
        id: parse_uuid(&id)?,
        voucher_type: row.try_get("voucher_type").map_err(read)?,
        value: row.try_get("value").map_err(read)?,
        created_at: parse_timestamp(&created_at)?,
        customer_id: customer_id.as_deref().map(parse_uuid).transpose()?,
    }
    .try_into()
}

fn decode_customer(row: &SqliteRow) -> Result<Customer, RepositoryError> {
    let read = |e: sqlx::Error| RepositoryError::storage(format!("failed to deserialize customer row: {e}"));

    let id: String = row.try_get("id").map_err(read)?;
    let created_at: String = row.try_get("created_at").map_err(read)?;

    CustomerRow {
        id: parse_uuid(&id)?,
        name: row.try_get("name").map_err(read)?,
        email: row.try_get("email").map_err(read)?,
        created_at: parse_timestamp(&created_at)?,
    }
    .try_into()
}

fn parse_uuid(s: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(s).map_err(|e| RepositoryError::storage(format!("invalid uuid '{s}' in row: {e}")))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::storage(format!("invalid timestamp '{s}' in row: {e}")))
}
