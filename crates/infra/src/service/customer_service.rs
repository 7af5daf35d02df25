use tracing::{info, instrument};

use voucherdesk_core::CustomerId;
use voucherdesk_customers::Customer;

use super::{ServiceError, ServiceResult};
use crate::repository::CustomerRepository;

#[derive(Debug, Clone)]
pub struct CustomerService<C> {
    customers: C,
}

impl<C: CustomerRepository> CustomerService<C> {
    pub fn new(customers: C) -> Self {
        Self { customers }
    }

    /// Register a new customer. A duplicate email is a `Conflict`.
    #[instrument(skip(self), err)]
    pub async fn register_customer(&self, name: &str, email: &str) -> ServiceResult<Customer> {
        let customer = Customer::register(name, email)?;
        let stored = self.customers.insert(customer).await?;
        info!(customer_id = %stored.id_typed(), "customer registered");
        Ok(stored)
    }

    pub async fn get_all_customers(&self) -> ServiceResult<Vec<Customer>> {
        Ok(self.customers.find_all().await?)
    }

    pub async fn get_customer_by_id(&self, id: CustomerId) -> ServiceResult<Customer> {
        self.customers
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("customer", id))
    }
}
