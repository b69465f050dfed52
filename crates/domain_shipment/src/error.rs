//! Shipment domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur in the shipment domain
#[derive(Debug, Error)]
pub enum ShipmentError {
    /// Shipment not found
    #[error("Shipment not found: {0}")]
    NotFound(String),

    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation conflicts with existing data
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A storage operation failed
    #[error(transparent)]
    Port(#[from] PortError),
}

impl ShipmentError {
    pub fn validation(message: impl Into<String>) -> Self {
        ShipmentError::Validation(message.into())
    }

    pub fn not_found(id: impl ToString) -> Self {
        ShipmentError::NotFound(id.to_string())
    }
}
