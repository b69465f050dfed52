//! Request/Response data transfer objects
//!
//! Monetary fields cross the wire as plain decimal amounts; the document's
//! currency applies to all of them.

pub mod customer;
pub mod shipment;
pub mod trip;
pub mod voucher;
