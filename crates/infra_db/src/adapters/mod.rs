//! PostgreSQL adapters for the domain store ports
//!
//! Aggregates are stored document-style: the filterable key fields live in
//! scalar columns (unique numbers, status flags, timestamps) and the full
//! aggregate is kept as a JSONB `doc` column that round-trips through serde.
//! Reads always deserialize `doc`; partial updates keep the flag columns and
//! the document in step within one statement.

pub mod customers;
pub mod shipments;
pub mod trips;
pub mod vouchers;

pub use customers::PgCustomerStore;
pub use shipments::PgShipmentStore;
pub use trips::PgTripStore;
pub use vouchers::PgVoucherStore;

use core_kernel::PortError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Deserializes a stored JSONB document into its aggregate
pub(crate) fn decode_doc<T: DeserializeOwned>(doc: serde_json::Value) -> Result<T, PortError> {
    serde_json::from_value(doc)
        .map_err(|e| PortError::internal(format!("stored document is corrupt: {}", e)))
}

/// Serializes an aggregate for storage
pub(crate) fn encode_doc<T: Serialize>(value: &T) -> Result<serde_json::Value, PortError> {
    serde_json::to_value(value)
        .map_err(|e| PortError::internal(format!("document serialization failed: {}", e)))
}
