//! Trip Domain - settlement binding
//!
//! Trips carry consolidated vouchers out for settlement. Binding is
//! all-or-nothing: a voucher already on a trip can never be bound again.

pub mod binder;
pub mod error;
pub mod ports;
pub mod trip;

pub use binder::{NewTrip, TripBinder};
pub use error::TripError;
pub use ports::{TripQuery, TripStore};
pub use trip::Trip;
