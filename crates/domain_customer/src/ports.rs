//! Customer domain ports

use async_trait::async_trait;

use core_kernel::{CustomerId, DomainPort, PortError};

use crate::customer::Customer;

/// Query parameters for listing customers
#[derive(Debug, Clone, Default)]
pub struct CustomerQuery {
    /// Exact-match name filter
    pub name: Option<String>,
    /// Exact-match phone filter
    pub phone: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Store port for the customer aggregate
#[async_trait]
pub trait CustomerStore: DomainPort {
    async fn insert(&self, customer: &Customer) -> Result<(), PortError>;

    /// Replaces the stored customer, ledger included
    async fn update(&self, customer: &Customer) -> Result<(), PortError>;

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, PortError>;

    /// Exact (name, phone) lookup used by shipment intake
    async fn find_by_name_phone(
        &self,
        name: &str,
        phone: &str,
    ) -> Result<Option<Customer>, PortError>;

    async fn find(&self, query: CustomerQuery) -> Result<Vec<Customer>, PortError>;

    async fn delete(&self, id: CustomerId) -> Result<(), PortError>;
}

/// In-memory mock store for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory implementation of `CustomerStore`
    #[derive(Debug, Default)]
    pub struct MemoryCustomerStore {
        customers: Arc<RwLock<HashMap<CustomerId, Customer>>>,
        fail_next_write: AtomicBool,
    }

    impl MemoryCustomerStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_customers(customers: Vec<Customer>) -> Self {
            let store = Self::new();
            for customer in customers {
                store.customers.write().await.insert(customer.id, customer);
            }
            store
        }

        /// Arms a one-shot failure on the next mutating call
        pub fn fail_next_write(&self) {
            self.fail_next_write.store(true, Ordering::SeqCst);
        }

        fn check_poison(&self) -> Result<(), PortError> {
            if self.fail_next_write.swap(false, Ordering::SeqCst) {
                return Err(PortError::internal("injected write failure"));
            }
            Ok(())
        }

        pub async fn count(&self) -> usize {
            self.customers.read().await.len()
        }
    }

    impl DomainPort for MemoryCustomerStore {}

    #[async_trait]
    impl CustomerStore for MemoryCustomerStore {
        async fn insert(&self, customer: &Customer) -> Result<(), PortError> {
            self.check_poison()?;
            self.customers
                .write()
                .await
                .insert(customer.id, customer.clone());
            Ok(())
        }

        async fn update(&self, customer: &Customer) -> Result<(), PortError> {
            self.check_poison()?;
            let mut customers = self.customers.write().await;
            if !customers.contains_key(&customer.id) {
                return Err(PortError::not_found("Customer", customer.id));
            }
            customers.insert(customer.id, customer.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, PortError> {
            Ok(self.customers.read().await.get(&id).cloned())
        }

        async fn find_by_name_phone(
            &self,
            name: &str,
            phone: &str,
        ) -> Result<Option<Customer>, PortError> {
            Ok(self
                .customers
                .read()
                .await
                .values()
                .find(|c| c.name == name && c.phone == phone)
                .cloned())
        }

        async fn find(&self, query: CustomerQuery) -> Result<Vec<Customer>, PortError> {
            let customers = self.customers.read().await;
            let mut results: Vec<_> = customers
                .values()
                .filter(|c| {
                    if let Some(ref name) = query.name {
                        if &c.name != name {
                            return false;
                        }
                    }
                    if let Some(ref phone) = query.phone {
                        if &c.phone != phone {
                            return false;
                        }
                    }
                    true
                })
                .cloned()
                .collect();
            results.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            if let Some(offset) = query.offset {
                results = results.into_iter().skip(offset as usize).collect();
            }
            if let Some(limit) = query.limit {
                results.truncate(limit as usize);
            }
            Ok(results)
        }

        async fn delete(&self, id: CustomerId) -> Result<(), PortError> {
            self.check_poison()?;
            self.customers
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Customer", id))
        }
    }
}
