//! Persistence boundary for vouchers and customers, with in-memory, SQLite and
//! Postgres backends.

mod customer;
mod error;
mod in_memory;
mod memory_table;
mod postgres;
mod rows;
mod sqlite;
mod voucher;

pub use customer::CustomerRepository;
pub use error::RepositoryError;
pub(crate) use error::map_sqlx_error;
pub use in_memory::{InMemoryCustomerRepository, InMemoryVoucherRepository};
pub use memory_table::MemoryTable;
pub use postgres::{PostgresCustomerRepository, PostgresVoucherRepository};
pub use sqlite::{SqliteCustomerRepository, SqliteVoucherRepository};
pub use voucher::VoucherRepository;
