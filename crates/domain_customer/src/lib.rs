//! Customer Domain - party records and per-bilty ledgers
//!
//! Customers are soft-identified by the (name, phone) pair written on the
//! bilty. Each customer embeds an ordered ledger with one entry per bilty.
//! The intake service keeps the ledger consistent with shipment creation.

pub mod customer;
pub mod error;
pub mod intake;
pub mod ledger;
pub mod ports;

pub use customer::{BiltyLedgerEntry, Customer, CustomerStatus};
pub use error::CustomerError;
pub use intake::ShipmentIntake;
pub use ledger::{CustomerService, CustomerUpdate, NewCustomer};
pub use ports::{CustomerQuery, CustomerStore};
