//! Trip domain ports

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError, TripId};

use crate::trip::Trip;

/// Query parameters for listing trips
#[derive(Debug, Clone, Default)]
pub struct TripQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Store port for the trip aggregate
#[async_trait]
pub trait TripStore: DomainPort {
    async fn insert(&self, trip: &Trip) -> Result<(), PortError>;

    async fn find_by_id(&self, id: TripId) -> Result<Option<Trip>, PortError>;

    async fn find(&self, query: TripQuery) -> Result<Vec<Trip>, PortError>;

    async fn delete(&self, id: TripId) -> Result<(), PortError>;
}

/// In-memory mock store for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory implementation of `TripStore`
    #[derive(Debug, Default)]
    pub struct MemoryTripStore {
        trips: Arc<RwLock<HashMap<TripId, Trip>>>,
        fail_next_write: AtomicBool,
    }

    impl MemoryTripStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Arms a one-shot failure on the next mutating call
        pub fn fail_next_write(&self) {
            self.fail_next_write.store(true, Ordering::SeqCst);
        }

        fn check_poison(&self) -> Result<(), PortError> {
            if self.fail_next_write.swap(false, Ordering::SeqCst) {
                return Err(PortError::internal("injected write failure"));
            }
            Ok(())
        }

        pub async fn count(&self) -> usize {
            self.trips.read().await.len()
        }
    }

    impl DomainPort for MemoryTripStore {}

    #[async_trait]
    impl TripStore for MemoryTripStore {
        async fn insert(&self, trip: &Trip) -> Result<(), PortError> {
            self.check_poison()?;
            self.trips.write().await.insert(trip.id, trip.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: TripId) -> Result<Option<Trip>, PortError> {
            Ok(self.trips.read().await.get(&id).cloned())
        }

        async fn find(&self, query: TripQuery) -> Result<Vec<Trip>, PortError> {
            let trips = self.trips.read().await;
            let mut results: Vec<_> = trips.values().cloned().collect();
            results.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            if let Some(offset) = query.offset {
                results = results.into_iter().skip(offset as usize).collect();
            }
            if let Some(limit) = query.limit {
                results.truncate(limit as usize);
            }
            Ok(results)
        }

        async fn delete(&self, id: TripId) -> Result<(), PortError> {
            self.trips
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Trip", id))
        }
    }
}
