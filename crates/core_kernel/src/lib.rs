//! Core Kernel - Foundational types and utilities for the freight billing system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed entity identifiers
//! - Document-number formats (bilty, voucher, trip) and serial sequences
//! - Port infrastructure shared by the domain store traits

pub mod error;
pub mod identifiers;
pub mod money;
pub mod numbering;
pub mod ports;

pub use error::CoreError;
pub use identifiers::{CustomerId, ShipmentId, TripId, VoucherId};
pub use money::{Currency, Money, MoneyError, Rate};
pub use numbering::{BiltyNumber, NumberError, TripNumber, VoucherNumber};
pub use ports::{DomainPort, InMemorySequence, PortError, SerialSequence};
