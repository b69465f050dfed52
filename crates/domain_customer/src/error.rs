//! Customer domain errors

use core_kernel::PortError;
use domain_shipment::ShipmentError;
use thiserror::Error;

/// Errors that can occur in the customer domain
#[derive(Debug, Error)]
pub enum CustomerError {
    /// Customer not found
    #[error("Customer not found: {0}")]
    NotFound(String),

    /// Ledger entry not found
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(String),

    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation conflicts with existing data
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Shipment-side failure during intake
    #[error(transparent)]
    Shipment(#[from] ShipmentError),

    /// A storage operation failed
    #[error(transparent)]
    Port(#[from] PortError),
}

impl CustomerError {
    pub fn validation(message: impl Into<String>) -> Self {
        CustomerError::Validation(message.into())
    }

    pub fn not_found(id: impl ToString) -> Self {
        CustomerError::NotFound(id.to_string())
    }
}
