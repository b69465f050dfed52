//! Infrastructure Database Layer
//!
//! PostgreSQL adapters for the freight billing domain store ports, built on
//! SQLx. Aggregates are stored document-style (scalar key columns plus a
//! JSONB `doc`), and serial counters back the atomic bilty numbering.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool_from_url, PgShipmentStore, PgSerialSequence};
//!
//! let pool = create_pool_from_url("postgres://localhost/freight").await?;
//! let shipments = PgShipmentStore::new(pool.clone());
//! let sequence = PgSerialSequence::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod sequence;

pub use adapters::{PgCustomerStore, PgShipmentStore, PgTripStore, PgVoucherStore};
pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use sequence::PgSerialSequence;
