use thiserror::Error;

/// Repository operation error.
///
/// These are **infrastructure errors** (storage, constraints) as opposed to
/// domain errors (value ranges, validation). "Not found" on reads is not an
/// error: finders return `Option`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A write targeted a record that does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A write collided with an existing record (duplicate id / unique key).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The entity has no identifier yet, so it cannot be addressed.
    #[error("entity has no identifier")]
    MissingId,

    /// Any failure of the storage medium (connectivity, undecodable rows, ...).
    #[error("storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// Map SQLx errors to `RepositoryError`.
///
/// | SQLx error | RepositoryError |
/// |------------|-----------------|
/// | Database (unique violation, Postgres `23505` / SQLite `2067`, `1555`) | `Conflict` |
/// | Database (other) | `Storage` |
/// | PoolClosed / RowNotFound / other | `Storage` |
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            if db_err.is_unique_violation() {
                RepositoryError::Conflict(msg)
            } else {
                RepositoryError::Storage(msg)
            }
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::Storage(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::RowNotFound => {
            RepositoryError::Storage(format!("unexpected row not found in {operation}"))
        }
        _ => RepositoryError::Storage(format!("sqlx error in {operation}: {err}")),
    }
}
