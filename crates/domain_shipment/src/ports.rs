//! Shipment domain ports
//!
//! `ShipmentStore` is everything the shipment services need from a data
//! source. The PostgreSQL adapter lives in `infra_db`; an in-memory mock is
//! available behind the `mock` feature for tests.

use async_trait::async_trait;

use core_kernel::{BiltyNumber, DomainPort, PortError, ShipmentId};

use crate::shipment::{DeliveryStatus, PaymentStatus, Shipment};

/// Query parameters for listing shipments
#[derive(Debug, Clone, Default)]
pub struct ShipmentQuery {
    pub payment_status: Option<PaymentStatus>,
    pub delivery_status: Option<DeliveryStatus>,
    pub voucher_made: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ShipmentQuery {
    /// Unpaid shipments that have not yet been rolled into a voucher
    pub fn available_for_voucher() -> Self {
        Self {
            payment_status: Some(PaymentStatus::Unpaid),
            voucher_made: Some(false),
            ..Default::default()
        }
    }

    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// Store port for the shipment aggregate
#[async_trait]
pub trait ShipmentStore: DomainPort {
    /// Inserts a new shipment; rejects a duplicate bilty number as a conflict
    async fn insert(&self, shipment: &Shipment) -> Result<(), PortError>;

    /// Replaces the stored shipment with the given state
    async fn update(&self, shipment: &Shipment) -> Result<(), PortError>;

    async fn find_by_id(&self, id: ShipmentId) -> Result<Option<Shipment>, PortError>;

    async fn find_by_bilty_number(
        &self,
        number: &BiltyNumber,
    ) -> Result<Option<Shipment>, PortError>;

    /// Lists shipments matching the query, newest first
    async fn find(&self, query: ShipmentQuery) -> Result<Vec<Shipment>, PortError>;

    async fn delete(&self, id: ShipmentId) -> Result<(), PortError>;

    /// Flags (or unflags) the given shipments as consumed by a voucher
    async fn set_voucher_made(&self, ids: &[ShipmentId], value: bool) -> Result<(), PortError>;
}

/// In-memory mock store for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory implementation of `ShipmentStore`
    ///
    /// `fail_next_write` makes the next mutating call return an internal
    /// error, which is how the orchestration tests exercise compensation
    /// paths.
    #[derive(Debug, Default)]
    pub struct MemoryShipmentStore {
        shipments: Arc<RwLock<HashMap<ShipmentId, Shipment>>>,
        fail_next_write: AtomicBool,
    }

    impl MemoryShipmentStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_shipments(shipments: Vec<Shipment>) -> Self {
            let store = Self::new();
            for shipment in shipments {
                store.shipments.write().await.insert(shipment.id, shipment);
            }
            store
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
            self.shipments.read().await.len()
        }
    }

    impl DomainPort for MemoryShipmentStore {}

    #[async_trait]
    impl ShipmentStore for MemoryShipmentStore {
        async fn insert(&self, shipment: &Shipment) -> Result<(), PortError> {
            self.check_poison()?;
            let mut shipments = self.shipments.write().await;
            if shipments
                .values()
                .any(|s| s.bilty_number == shipment.bilty_number)
            {
                return Err(PortError::conflict(format!(
                    "bilty number {} already exists",
                    shipment.bilty_number
                )));
            }
            shipments.insert(shipment.id, shipment.clone());
            Ok(())
        }

        async fn update(&self, shipment: &Shipment) -> Result<(), PortError> {
            self.check_poison()?;
            let mut shipments = self.shipments.write().await;
            if !shipments.contains_key(&shipment.id) {
                return Err(PortError::not_found("Shipment", shipment.id));
            }
            shipments.insert(shipment.id, shipment.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: ShipmentId) -> Result<Option<Shipment>, PortError> {
            Ok(self.shipments.read().await.get(&id).cloned())
        }

        async fn find_by_bilty_number(
            &self,
            number: &BiltyNumber,
        ) -> Result<Option<Shipment>, PortError> {
            Ok(self
                .shipments
                .read()
                .await
                .values()
                .find(|s| &s.bilty_number == number)
                .cloned())
        }

        async fn find(&self, query: ShipmentQuery) -> Result<Vec<Shipment>, PortError> {
            let shipments = self.shipments.read().await;
            let mut results: Vec<_> = shipments
                .values()
                .filter(|s| {
                    if let Some(status) = query.payment_status {
                        if s.payment_status != status {
                            return false;
                        }
                    }
                    if let Some(status) = query.delivery_status {
                        if s.delivery_status != status {
                            return false;
                        }
                    }
                    if let Some(voucher_made) = query.voucher_made {
                        if s.voucher_made != voucher_made {
                            return false;
                        }
                    }
                    true
                })
                .cloned()
                .collect();
            results.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            if let Some(offset) = query.offset {
                results = results.into_iter().skip(offset as usize).collect();
            }
            if let Some(limit) = query.limit {
                results.truncate(limit as usize);
            }
            Ok(results)
        }

        async fn delete(&self, id: ShipmentId) -> Result<(), PortError> {
            self.check_poison()?;
            self.shipments
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Shipment", id))
        }

        async fn set_voucher_made(
            &self,
            ids: &[ShipmentId],
            value: bool,
        ) -> Result<(), PortError> {
            self.check_poison()?;
            let mut shipments = self.shipments.write().await;
            for id in ids {
                let shipment = shipments
                    .get_mut(id)
                    .ok_or_else(|| PortError::not_found("Shipment", id))?;
                shipment.voucher_made = value;
                shipment.touch();
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MemoryShipmentStore;
    use super::*;
    use crate::shipment::Shipment;
    use chrono::NaiveDate;
    use core_kernel::Currency;

    fn test_shipment(serial: u64) -> Shipment {
        Shipment::new(
            BiltyNumber::from_parts(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(), serial),
            "Ali Traders",
            "0300-1234567",
            "Karachi Hardware",
            "0321-7654321",
            "Lahore Adda",
            Currency::PKR,
            "clerk-1",
        )
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryShipmentStore::new();
        let shipment = test_shipment(1);
        store.insert(&shipment).await.unwrap();

        let found = store.find_by_id(shipment.id).await.unwrap();
        assert!(found.is_some());

        let by_number = store
            .find_by_bilty_number(&shipment.bilty_number)
            .await
            .unwrap();
        assert_eq!(by_number.map(|s| s.id), Some(shipment.id));
    }

    #[tokio::test]
    async fn test_duplicate_bilty_number_conflicts() {
        let store = MemoryShipmentStore::new();
        store.insert(&test_shipment(1)).await.unwrap();

        let err = store.insert(&test_shipment(1)).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_available_for_voucher_filter() {
        let store = MemoryShipmentStore::new();
        let mut consumed = test_shipment(1);
        consumed.voucher_made = true;
        store.insert(&consumed).await.unwrap();
        store.insert(&test_shipment(2)).await.unwrap();

        let available = store
            .find(ShipmentQuery::available_for_voucher())
            .await
            .unwrap();
        assert_eq!(available.len(), 1);
        assert!(!available[0].voucher_made);
    }

    #[tokio::test]
    async fn test_set_voucher_made() {
        let store = MemoryShipmentStore::new();
        let shipment = test_shipment(1);
        store.insert(&shipment).await.unwrap();

        store.set_voucher_made(&[shipment.id], true).await.unwrap();
        let reloaded = store.find_by_id(shipment.id).await.unwrap().unwrap();
        assert!(reloaded.voucher_made);
    }
}
