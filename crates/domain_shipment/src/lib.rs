//! Shipment Domain - Bilty issuance and fare billing
//!
//! This crate owns the shipment ("bilty") aggregate: line items, handling
//! surcharges, and the settlement fields derived by the fare calculator.
//! It also carries the repair job that sweeps historical records back into
//! consistency.

pub mod error;
pub mod fare;
pub mod ports;
pub mod repair;
pub mod service;
pub mod shipment;

pub use error::ShipmentError;
pub use fare::{recalculate, FareDelta};
pub use ports::{ShipmentQuery, ShipmentStore};
pub use repair::{RepairFailure, RepairJob, RepairReport};
pub use service::{NewLineItem, NewShipment, ShipmentService, ShipmentUpdate};
pub use shipment::{DeliveryStatus, LineItem, PaymentStatus, Shipment, Surcharges};
