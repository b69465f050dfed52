//! Voucher domain ports

use async_trait::async_trait;

use core_kernel::{CustomerId, DomainPort, PortError, VoucherId, VoucherNumber};

use crate::voucher::Voucher;

/// Query parameters for listing vouchers
#[derive(Debug, Clone, Default)]
pub struct VoucherQuery {
    pub customer_id: Option<CustomerId>,
    pub trip_made: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl VoucherQuery {
    /// Vouchers not yet bound into a trip settlement
    pub fn available_for_trip() -> Self {
        Self {
            trip_made: Some(false),
            ..Default::default()
        }
    }
}

/// Store port for the voucher aggregate
#[async_trait]
pub trait VoucherStore: DomainPort {
    /// Inserts a new voucher; rejects a duplicate voucher number as a conflict
    async fn insert(&self, voucher: &Voucher) -> Result<(), PortError>;

    async fn update(&self, voucher: &Voucher) -> Result<(), PortError>;

    async fn find_by_id(&self, id: VoucherId) -> Result<Option<Voucher>, PortError>;

    async fn find_by_number(&self, number: &VoucherNumber) -> Result<Option<Voucher>, PortError>;

    async fn find(&self, query: VoucherQuery) -> Result<Vec<Voucher>, PortError>;

    async fn delete(&self, id: VoucherId) -> Result<(), PortError>;

    /// Flags the given vouchers as bound into a trip
    ///
    /// Implementations must reject the whole call with a conflict if any of
    /// the vouchers is already flagged, so a lost race surfaces instead of a
    /// silent double-assignment.
    async fn mark_trip_made(&self, ids: &[VoucherId]) -> Result<(), PortError>;

    /// Clears the trip flag (compensation path)
    async fn clear_trip_made(&self, ids: &[VoucherId]) -> Result<(), PortError>;
}

/// In-memory mock store for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory implementation of `VoucherStore`
    #[derive(Debug, Default)]
    pub struct MemoryVoucherStore {
        vouchers: Arc<RwLock<HashMap<VoucherId, Voucher>>>,
        fail_next_write: AtomicBool,
    }

    impl MemoryVoucherStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_vouchers(vouchers: Vec<Voucher>) -> Self {
            let store = Self::new();
            for voucher in vouchers {
                store.vouchers.write().await.insert(voucher.id, voucher);
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
            self.vouchers.read().await.len()
        }
    }

    impl DomainPort for MemoryVoucherStore {}

    #[async_trait]
    impl VoucherStore for MemoryVoucherStore {
        async fn insert(&self, voucher: &Voucher) -> Result<(), PortError> {
            self.check_poison()?;
            let mut vouchers = self.vouchers.write().await;
            if vouchers
                .values()
                .any(|v| v.voucher_number == voucher.voucher_number)
            {
                return Err(PortError::conflict(format!(
                    "voucher number {} already exists",
                    voucher.voucher_number
                )));
            }
            vouchers.insert(voucher.id, voucher.clone());
            Ok(())
        }

        async fn update(&self, voucher: &Voucher) -> Result<(), PortError> {
            self.check_poison()?;
            let mut vouchers = self.vouchers.write().await;
            if !vouchers.contains_key(&voucher.id) {
                return Err(PortError::not_found("Voucher", voucher.id));
            }
            vouchers.insert(voucher.id, voucher.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: VoucherId) -> Result<Option<Voucher>, PortError> {
            Ok(self.vouchers.read().await.get(&id).cloned())
        }

        async fn find_by_number(
            &self,
            number: &VoucherNumber,
        ) -> Result<Option<Voucher>, PortError> {
            Ok(self
                .vouchers
                .read()
                .await
                .values()
                .find(|v| &v.voucher_number == number)
                .cloned())
        }

        async fn find(&self, query: VoucherQuery) -> Result<Vec<Voucher>, PortError> {
            let vouchers = self.vouchers.read().await;
            let mut results: Vec<_> = vouchers
                .values()
                .filter(|v| {
                    if let Some(customer_id) = query.customer_id {
                        if v.customer_id != customer_id {
                            return false;
                        }
                    }
                    if let Some(trip_made) = query.trip_made {
                        if v.trip_made != trip_made {
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

        async fn delete(&self, id: VoucherId) -> Result<(), PortError> {
            self.check_poison()?;
            self.vouchers
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Voucher", id))
        }

        async fn mark_trip_made(&self, ids: &[VoucherId]) -> Result<(), PortError> {
            self.check_poison()?;
            let mut vouchers = self.vouchers.write().await;
            // Validate the whole batch before touching anything.
            for id in ids {
                let voucher = vouchers
                    .get(id)
                    .ok_or_else(|| PortError::not_found("Voucher", id))?;
                if voucher.trip_made {
                    return Err(PortError::conflict(format!(
                        "voucher {} is already on a trip",
                        voucher.voucher_number
                    )));
                }
            }
            for id in ids {
                if let Some(voucher) = vouchers.get_mut(id) {
                    voucher.trip_made = true;
                    voucher.touch();
                }
            }
            Ok(())
        }

        async fn clear_trip_made(&self, ids: &[VoucherId]) -> Result<(), PortError> {
            let mut vouchers = self.vouchers.write().await;
            for id in ids {
                if let Some(voucher) = vouchers.get_mut(id) {
                    voucher.trip_made = false;
                    voucher.touch();
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MemoryVoucherStore;
    use super::*;
    use crate::voucher::{Voucher, VoucherBiltyRef};
    use chrono::NaiveDate;
    use core_kernel::{BiltyNumber, Currency, Money, Rate, ShipmentId};
    use rust_decimal_macros::dec;

    fn voucher(number: &str) -> Voucher {
        Voucher::new(
            number.parse().unwrap(),
            CustomerId::new_v7(),
            Currency::PKR,
            vec![VoucherBiltyRef {
                shipment_id: ShipmentId::new_v7(),
                bilty_number: BiltyNumber::from_parts(
                    NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
                    1,
                ),
                amount: Money::new(dec!(280), Currency::PKR),
            }],
            Rate::from_percentage(dec!(0)),
            "clerk-1",
        )
    }

    #[tokio::test]
    async fn test_duplicate_number_conflicts() {
        let store = MemoryVoucherStore::new();
        store.insert(&voucher("VCH-2024-0307-001")).await.unwrap();

        let err = store
            .insert(&voucher("VCH-2024-0307-001"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_mark_trip_made_is_all_or_nothing() {
        let store = MemoryVoucherStore::new();
        let mut taken = voucher("VCH-2024-0307-001");
        taken.trip_made = true;
        let fresh = voucher("VCH-2024-0307-002");
        store.insert(&taken).await.unwrap();
        store.insert(&fresh).await.unwrap();

        let err = store
            .mark_trip_made(&[fresh.id, taken.id])
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // The fresh voucher must not have been flagged.
        let reloaded = store.find_by_id(fresh.id).await.unwrap().unwrap();
        assert!(!reloaded.trip_made);
    }
}
