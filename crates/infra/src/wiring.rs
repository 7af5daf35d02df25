//! Backend selection: turns an [`AppConfig`] into ready-to-use services.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::{AppConfig, Profile};
use crate::db;
use crate::repository::{
    CustomerRepository, InMemoryCustomerRepository, InMemoryVoucherRepository, PostgresCustomerRepository,
    PostgresVoucherRepository, SqliteCustomerRepository, SqliteVoucherRepository, VoucherRepository,
};
use crate::service::{CustomerService, VoucherService};

pub type DynVoucherRepository = Arc<dyn VoucherRepository>;
pub type DynCustomerRepository = Arc<dyn CustomerRepository>;

/// Services shared by the adapters.
#[derive(Clone)]
pub struct Services {
    pub vouchers: VoucherService<DynVoucherRepository, DynCustomerRepository>,
    pub customers: CustomerService<DynCustomerRepository>,
}

impl Services {
    pub fn from_repositories(vouchers: DynVoucherRepository, customers: DynCustomerRepository) -> Self {
        Self {
            vouchers: VoucherService::new(vouchers, customers.clone()),
            customers: CustomerService::new(customers),
        }
    }

    /// In-memory services (dev profile, tests).
    pub fn in_memory() -> Self {
        Self::from_repositories(
            Arc::new(InMemoryVoucherRepository::new()),
            Arc::new(InMemoryCustomerRepository::new()),
        )
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<Services> {
    let services = match (config.profile, config.database_url.as_deref()) {
        (Profile::Dev, _) => Services::in_memory(),
        (Profile::Test, url) => {
            let url = url.unwrap_or(crate::config::DEFAULT_TEST_DATABASE_URL);
            let pool = db::connect_sqlite(url, config.max_connections)
                .await
                .with_context(|| format!("failed to open SQLite database at {url}"))?;
            Services::from_repositories(
                Arc::new(SqliteVoucherRepository::new(pool.clone())),
                Arc::new(SqliteCustomerRepository::new(pool)),
            )
        }
        (Profile::Production, Some(url)) => {
            let pool = db::connect_postgres(url, config.max_connections)
                .await
                .context("failed to connect to Postgres")?;
            Services::from_repositories(
                Arc::new(PostgresVoucherRepository::new(pool.clone())),
                Arc::new(PostgresCustomerRepository::new(pool)),
            )
        }
        (Profile::Production, None) => anyhow::bail!("DATABASE_URL must be set for the production profile"),
    };

    info!(profile = %config.profile, "services wired");
    Ok(services)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voucherdesk_vouchers::VoucherType;

    fn config(profile: Profile, database_url: Option<&str>) -> AppConfig {
        AppConfig {
            profile,
            database_url: database_url.map(str::to_string),
            max_connections: 2,
            bind: crate::config::DEFAULT_BIND.parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn dev_profile_wires_in_memory_stores() {
        let services = build_services(&config(Profile::Dev, None)).await.unwrap();
        services
            .vouchers
            .create_voucher(VoucherType::FixedAmount, "100")
            .await
            .unwrap();
        assert_eq!(services.vouchers.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_profile_wires_sqlite_with_shared_customers() {
        let services = build_services(&config(Profile::Test, Some("sqlite::memory:")))
            .await
            .unwrap();

        let customer = services
            .customers
            .register_customer("tester", "tester@mail.com")
            .await
            .unwrap();
        let voucher = services
            .vouchers
            .create_voucher(VoucherType::PercentDiscount, "20")
            .await
            .unwrap();

        let owned = services
            .vouchers
            .change_owner(voucher.id_typed().unwrap(), customer.id_typed())
            .await
            .unwrap();
        assert_eq!(owned.customer_id(), Some(customer.id_typed()));
    }

    #[tokio::test]
    async fn production_without_url_is_rejected() {
        assert!(build_services(&config(Profile::Production, None)).await.is_err());
    }
}
