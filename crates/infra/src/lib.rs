//! Infrastructure layer: repositories, database pools, config, services and
//! the file snapshot format.

pub mod config;
pub mod db;
pub mod repository;
pub mod service;
pub mod snapshot;
pub mod wiring;

pub use config::{AppConfig, ConfigError, Profile};
pub use repository::{CustomerRepository, RepositoryError, VoucherRepository};
pub use service::{CustomerService, ServiceError, ServiceResult, VoucherService};
pub use wiring::{build_services, Services};
