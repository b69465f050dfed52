//! Ports and Adapters Infrastructure
//!
//! Foundational types for the hexagonal (ports and adapters) layout used by
//! the domain crates. Each domain defines its own store port trait extending
//! the marker trait here; `infra_db` provides the PostgreSQL adapters and the
//! domain crates ship in-memory mocks for tests.
//!
//! ```rust,ignore
//! // In domain_shipment/src/ports.rs
//! #[async_trait]
//! pub trait ShipmentStore: DomainPort {
//!     async fn find_by_id(&self, id: ShipmentId) -> Result<Option<Shipment>, PortError>;
//!     async fn insert(&self, shipment: &Shipment) -> Result<(), PortError>;
//! }
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use thiserror::Error;

/// Error type for port operations
///
/// Unified error type that all port implementations use, so domain services
/// handle storage failures the same way regardless of the adapter behind the
/// port.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// The operation conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a Validation error with field information
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, PortError::Connection { .. })
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    /// Returns true if this error indicates a conflict with existing data
    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }
}

/// Marker trait for all domain ports
///
/// All port traits should extend this marker to ensure they are
/// thread-safe and can be used in async contexts.
pub trait DomainPort: Send + Sync + 'static {}

/// Atomic, scoped serial counter
///
/// Document numbers that carry a per-day serial (bilty numbers) draw from
/// this port instead of parsing the most recent record, so concurrent
/// creations never mint the same serial. Scopes are opaque strings such as
/// `bilty:20240307`; each scope counts from 1.
#[async_trait]
pub trait SerialSequence: DomainPort {
    /// Returns the next serial for the scope, starting at 1
    async fn next(&self, scope: &str) -> Result<u64, PortError>;
}

/// In-memory sequence for tests and single-process use
#[derive(Debug, Default)]
pub struct InMemorySequence {
    counters: Mutex<HashMap<String, u64>>,
}

impl InMemorySequence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemorySequence {}

#[async_trait]
impl SerialSequence for InMemorySequence {
    async fn next(&self, scope: &str) -> Result<u64, PortError> {
        let mut counters = self
            .counters
            .lock()
            .map_err(|_| PortError::internal("sequence mutex poisoned"))?;
        let counter = counters.entry(scope.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("Shipment", "SHP-123");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert!(error.to_string().contains("Shipment"));
        assert!(error.to_string().contains("SHP-123"));
    }

    #[test]
    fn test_port_error_classification() {
        let conflict = PortError::conflict("bilty number already in ledger");
        assert!(conflict.is_conflict());
        assert!(!conflict.is_transient());

        let connection = PortError::connection("pool exhausted");
        assert!(connection.is_transient());

        let validation = PortError::validation("quantity must be non-negative");
        assert!(!validation.is_transient());
        assert!(!validation.is_conflict());
    }

    #[tokio::test]
    async fn test_in_memory_sequence_counts_per_scope() {
        let seq = InMemorySequence::new();
        assert_eq!(seq.next("bilty:20240307").await.unwrap(), 1);
        assert_eq!(seq.next("bilty:20240307").await.unwrap(), 2);
        assert_eq!(seq.next("bilty:20240308").await.unwrap(), 1);
    }
}
