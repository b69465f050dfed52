//! Trip domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur in the trip domain
#[derive(Debug, Error)]
pub enum TripError {
    /// Trip not found
    #[error("Trip not found: {0}")]
    NotFound(String),

    /// A referenced voucher does not exist
    #[error("Voucher not found: {0}")]
    VoucherNotFound(String),

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

impl TripError {
    pub fn validation(message: impl Into<String>) -> Self {
        TripError::Validation(message.into())
    }

    pub fn not_found(id: impl ToString) -> Self {
        TripError::NotFound(id.to_string())
    }
}
