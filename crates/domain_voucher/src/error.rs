//! Voucher domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur in the voucher domain
#[derive(Debug, Error)]
pub enum VoucherError {
    /// Voucher not found
    #[error("Voucher not found: {0}")]
    NotFound(String),

    /// A referenced shipment does not exist
    #[error("Shipment not found: {0}")]
    ShipmentNotFound(String),

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

impl VoucherError {
    pub fn validation(message: impl Into<String>) -> Self {
        VoucherError::Validation(message.into())
    }

    pub fn not_found(id: impl ToString) -> Self {
        VoucherError::NotFound(id.to_string())
    }
}
