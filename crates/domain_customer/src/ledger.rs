//! Customer CRUD and direct ledger operations
//!
//! Back-office staff edit customers and their ledgers directly (corrections,
//! manual bilties, write-offs). All mutations load the aggregate, apply the
//! change in memory, and store the whole document back.

use std::sync::Arc;

use tracing::{info, instrument};

use core_kernel::{BiltyNumber, CustomerId, Money};
use domain_shipment::PaymentStatus;

use crate::customer::{BiltyLedgerEntry, Customer, CustomerStatus};
use crate::error::CustomerError;
use crate::ports::{CustomerQuery, CustomerStore};

/// Input for creating a customer directly
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
}

/// Field allow-list for customer updates
#[derive(Debug, Clone, Default)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: Option<CustomerStatus>,
}

/// Application service for customers and their bilty ledgers
pub struct CustomerService {
    store: Arc<dyn CustomerStore>,
}

impl CustomerService {
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<dyn CustomerStore> {
        Arc::clone(&self.store)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: NewCustomer) -> Result<Customer, CustomerError> {
        if input.name.trim().is_empty() {
            return Err(CustomerError::validation("customer name is required"));
        }
        if input.phone.trim().is_empty() {
            return Err(CustomerError::validation("customer phone is required"));
        }
        if self
            .store
            .find_by_name_phone(&input.name, &input.phone)
            .await?
            .is_some()
        {
            return Err(CustomerError::Conflict(format!(
                "customer {} / {} already exists",
                input.name, input.phone
            )));
        }

        let mut customer = Customer::new(input.name, input.phone);
        customer.address = input.address;
        self.store.insert(&customer).await?;
        info!(customer = %customer.id, "customer created");
        Ok(customer)
    }

    pub async fn get(&self, id: CustomerId) -> Result<Customer, CustomerError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CustomerError::not_found(id))
    }

    pub async fn list(&self, query: CustomerQuery) -> Result<Vec<Customer>, CustomerError> {
        Ok(self.store.find(query).await?)
    }

    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Customer, CustomerError> {
        let mut customer = self.get(id).await?;
        if let Some(name) = update.name {
            customer.name = name;
        }
        if let Some(phone) = update.phone {
            customer.phone = phone;
        }
        if let Some(address) = update.address {
            customer.address = Some(address);
        }
        if let Some(status) = update.status {
            customer.status = status;
        }
        customer.touch();
        self.store.update(&customer).await?;
        Ok(customer)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: CustomerId) -> Result<(), CustomerError> {
        match self.store.delete(id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Err(CustomerError::not_found(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Appends a ledger entry by hand; duplicate bilty numbers conflict
    #[instrument(skip(self))]
    pub async fn add_bilty(
        &self,
        id: CustomerId,
        bilty_number: BiltyNumber,
        amount_to_be_paid: Money,
    ) -> Result<Customer, CustomerError> {
        let mut customer = self.get(id).await?;
        customer.add_ledger_entry(BiltyLedgerEntry::unpaid(bilty_number, amount_to_be_paid))?;
        self.store.update(&customer).await?;
        Ok(customer)
    }

    /// Flips one ledger entry between paid and unpaid
    #[instrument(skip(self))]
    pub async fn set_bilty_payment_status(
        &self,
        id: CustomerId,
        bilty_number: &BiltyNumber,
        status: PaymentStatus,
    ) -> Result<Customer, CustomerError> {
        let mut customer = self.get(id).await?;
        customer.set_entry_payment_status(bilty_number, status)?;
        self.store.update(&customer).await?;
        info!(customer = %id, bilty = %bilty_number, ?status, "ledger entry status changed");
        Ok(customer)
    }

    #[instrument(skip(self))]
    pub async fn remove_bilty(
        &self,
        id: CustomerId,
        bilty_number: &BiltyNumber,
    ) -> Result<Customer, CustomerError> {
        let mut customer = self.get(id).await?;
        customer.remove_ledger_entry(bilty_number)?;
        self.store.update(&customer).await?;
        Ok(customer)
    }
}
