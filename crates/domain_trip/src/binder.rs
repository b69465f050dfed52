//! Trip settlement binding
//!
//! Binding vouchers onto a trip removes them from the available pool. The
//! binder validates every voucher up front, persists the trip, then flags
//! the vouchers through the guarded `mark_trip_made`; a voucher grabbed by a
//! concurrent trip surfaces as a conflict, and the freshly inserted trip is
//! removed again.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use core_kernel::{TripId, VoucherId};
use domain_voucher::VoucherStore;

use crate::error::TripError;
use crate::ports::{TripQuery, TripStore};
use crate::trip::Trip;

/// Input for creating a trip
#[derive(Debug, Clone)]
pub struct NewTrip {
    pub driver_name: String,
    pub driver_phone: String,
    pub vehicle_number: String,
    pub origin: String,
    pub destination: String,
    pub voucher_ids: Vec<VoucherId>,
}

/// Application service binding vouchers onto trips
pub struct TripBinder {
    trips: Arc<dyn TripStore>,
    vouchers: Arc<dyn VoucherStore>,
}

impl TripBinder {
    pub fn new(trips: Arc<dyn TripStore>, vouchers: Arc<dyn VoucherStore>) -> Self {
        Self { trips, vouchers }
    }

    /// Creates a trip and consumes its vouchers
    #[instrument(skip(self, input), fields(vehicle = %input.vehicle_number))]
    pub async fn create(&self, input: NewTrip, created_by: &str) -> Result<Trip, TripError> {
        if input.voucher_ids.is_empty() {
            return Err(TripError::validation("a trip needs at least one voucher"));
        }
        if input.driver_name.trim().is_empty() {
            return Err(TripError::validation("driver name is required"));
        }

        // Validate every voucher before writing anything. The store-level
        // guard still protects against a concurrent trip between this check
        // and the flag write.
        for id in &input.voucher_ids {
            let voucher = self
                .vouchers
                .find_by_id(*id)
                .await?
                .ok_or_else(|| TripError::VoucherNotFound(id.to_string()))?;
            if voucher.trip_made {
                return Err(TripError::Conflict(format!(
                    "voucher {} is already on a trip",
                    voucher.voucher_number
                )));
            }
        }

        let trip = Trip::new(
            input.driver_name,
            input.driver_phone,
            input.vehicle_number,
            input.origin,
            input.destination,
            input.voucher_ids.clone(),
            created_by,
        );
        self.trips.insert(&trip).await?;

        if let Err(flag_err) = self.vouchers.mark_trip_made(&input.voucher_ids).await {
            warn!(
                trip = %trip.trip_number,
                error = %flag_err,
                "flagging vouchers failed, rolling back trip"
            );
            if let Err(rollback_err) = self.trips.delete(trip.id).await {
                error!(
                    trip = %trip.trip_number,
                    error = %rollback_err,
                    "rollback of orphaned trip failed"
                );
            }
            return Err(flag_err.into());
        }

        info!(trip = %trip.trip_number, vouchers = trip.voucher_ids.len(), "trip created");
        Ok(trip)
    }

    pub async fn get(&self, id: TripId) -> Result<Trip, TripError> {
        self.trips
            .find_by_id(id)
            .await?
            .ok_or_else(|| TripError::not_found(id))
    }

    pub async fn list(&self, query: TripQuery) -> Result<Vec<Trip>, TripError> {
        Ok(self.trips.find(query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::MemoryTripStore;
    use chrono::NaiveDate;
    use core_kernel::{BiltyNumber, Currency, CustomerId, Money, Rate, ShipmentId};
    use domain_voucher::ports::mock::MemoryVoucherStore;
    use domain_voucher::{Voucher, VoucherBiltyRef};
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

    struct Fixture {
        binder: TripBinder,
        trips: Arc<MemoryTripStore>,
        vouchers: Arc<MemoryVoucherStore>,
    }

    async fn fixture(vouchers: Vec<Voucher>) -> Fixture {
        let voucher_store = Arc::new(MemoryVoucherStore::with_vouchers(vouchers).await);
        let trip_store = Arc::new(MemoryTripStore::new());
        Fixture {
            binder: TripBinder::new(
                Arc::clone(&trip_store) as _,
                Arc::clone(&voucher_store) as _,
            ),
            trips: trip_store,
            vouchers: voucher_store,
        }
    }

    fn input(voucher_ids: Vec<VoucherId>) -> NewTrip {
        NewTrip {
            driver_name: "Rashid".to_string(),
            driver_phone: "0345-1112223".to_string(),
            vehicle_number: "LES-1234".to_string(),
            origin: "Lahore".to_string(),
            destination: "Karachi".to_string(),
            voucher_ids,
        }
    }

    #[tokio::test]
    async fn test_create_binds_vouchers() {
        let v = voucher("VCH-2024-0307-001");
        let f = fixture(vec![v.clone()]).await;

        let trip = f.binder.create(input(vec![v.id]), "clerk-1").await.unwrap();
        assert_eq!(trip.voucher_ids, vec![v.id]);

        let reloaded = f.vouchers.find_by_id(v.id).await.unwrap().unwrap();
        assert!(reloaded.trip_made);
    }

    #[tokio::test]
    async fn test_consumed_voucher_is_rejected() {
        let mut v = voucher("VCH-2024-0307-001");
        v.trip_made = true;
        let f = fixture(vec![v.clone()]).await;

        let err = f.binder.create(input(vec![v.id]), "clerk-1").await.unwrap_err();
        assert!(matches!(err, TripError::Conflict(_)));
        assert_eq!(f.trips.count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_voucher_is_rejected() {
        let f = fixture(vec![]).await;
        let err = f
            .binder
            .create(input(vec![VoucherId::new_v7()]), "clerk-1")
            .await
            .unwrap_err();
        assert!(matches!(err, TripError::VoucherNotFound(_)));
    }

    #[tokio::test]
    async fn test_flagging_failure_rolls_back_the_trip() {
        let v = voucher("VCH-2024-0307-001");
        let f = fixture(vec![v.clone()]).await;
        f.vouchers.fail_next_write();

        let result = f.binder.create(input(vec![v.id]), "clerk-1").await;
        assert!(result.is_err());
        assert_eq!(f.trips.count().await, 0);

        let reloaded = f.vouchers.find_by_id(v.id).await.unwrap().unwrap();
        assert!(!reloaded.trip_made);
    }
}
