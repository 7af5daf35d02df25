//! Connection pools and schema bootstrap for the relational backends.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{PgPool, SqlitePool};
use tracing::info;

use crate::repository::{map_sqlx_error, RepositoryError};

/// Postgres schema. `customers` comes first because `vouchers` references it.
const POSTGRES_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        id         UUID PRIMARY KEY,
        name       TEXT NOT NULL,
        email      TEXT NOT NULL UNIQUE,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS vouchers (
        id           UUID PRIMARY KEY,
        voucher_type TEXT NOT NULL,
        value        BIGINT NOT NULL,
        created_at   TIMESTAMPTZ NOT NULL,
        customer_id  UUID NULL REFERENCES customers(id) ON DELETE SET NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS vouchers_type_idx ON vouchers (voucher_type)",
];

/// SQLite schema: ids and timestamps are TEXT.
const SQLITE_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        id         TEXT PRIMARY KEY NOT NULL,
        name       TEXT NOT NULL,
        email      TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS vouchers (
        id           TEXT PRIMARY KEY NOT NULL,
        voucher_type TEXT NOT NULL,
        value        INTEGER NOT NULL,
        created_at   TEXT NOT NULL,
        customer_id  TEXT NULL REFERENCES customers(id) ON DELETE SET NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS vouchers_type_idx ON vouchers (voucher_type)",
];

/// Connect to Postgres and make sure the schema exists.
pub async fn connect_postgres(database_url: &str, max_connections: u32) -> Result<PgPool, RepositoryError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect_postgres", e))?;

    for statement in POSTGRES_SCHEMA {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .map_err(|e| map_sqlx_error("create_postgres_schema", e))?;
    }

    info!(max_connections, "postgres connection pool initialized");
    Ok(pool)
}

/// Connect to SQLite (file or `sqlite::memory:`) and make sure the schema exists.
///
/// An in-memory database lives and dies with its connection, so for those URLs
/// the pool is pinned to one connection that never expires.
pub async fn connect_sqlite(database_url: &str, max_connections: u32) -> Result<SqlitePool, RepositoryError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| map_sqlx_error("parse_sqlite_url", e))?
        .create_if_missing(true)
        .foreign_keys(true);

    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        SqlitePoolOptions::new().max_connections(max_connections)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| map_sqlx_error("connect_sqlite", e))?;

    for statement in SQLITE_SCHEMA {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .map_err(|e| map_sqlx_error("create_sqlite_schema", e))?;
    }

    info!(in_memory, "sqlite connection pool initialized");
    Ok(pool)
}
