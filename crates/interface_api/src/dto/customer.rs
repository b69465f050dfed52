//! Customer DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::Currency;
use domain_customer::{BiltyLedgerEntry, Customer, CustomerStatus, CustomerUpdate, NewCustomer};
use domain_shipment::PaymentStatus;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub phone: String,
    pub address: Option<String>,
}

impl CreateCustomerRequest {
    pub fn into_domain(self) -> NewCustomer {
        NewCustomer {
            name: self.name,
            phone: self.phone,
            address: self.address,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: Option<CustomerStatus>,
}

impl UpdateCustomerRequest {
    pub fn into_domain(self) -> CustomerUpdate {
        CustomerUpdate {
            name: self.name,
            phone: self.phone,
            address: self.address,
            status: self.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddLedgerEntryRequest {
    pub bilty_number: String,
    pub amount_to_be_paid: Decimal,
    pub currency: Currency,
}

#[derive(Debug, Deserialize)]
pub struct SetLedgerStatusRequest {
    pub payment_status: PaymentStatus,
}

/// List filters, all optional
#[derive(Debug, Default, Deserialize)]
pub struct CustomerListParams {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LedgerEntryResponse {
    pub bilty_number: String,
    pub amount_to_be_paid: Decimal,
    pub payment_status: PaymentStatus,
    pub paid_by_customer: Decimal,
}

impl From<BiltyLedgerEntry> for LedgerEntryResponse {
    fn from(entry: BiltyLedgerEntry) -> Self {
        Self {
            bilty_number: entry.bilty_number.to_string(),
            amount_to_be_paid: entry.amount_to_be_paid.amount(),
            payment_status: entry.payment_status,
            paid_by_customer: entry.paid_by_customer.amount(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub status: CustomerStatus,
    pub ledger: Vec<LedgerEntryResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id.into(),
            name: c.name,
            phone: c.phone,
            address: c.address,
            status: c.status,
            ledger: c.ledger.into_iter().map(Into::into).collect(),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}
