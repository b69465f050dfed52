//! Trip aggregate
//!
//! A trip is an outbound vehicle departure carrying the vouchers being
//! settled on that run. Driver and vehicle are plain attributes here; fleet
//! management lives elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{TripId, TripNumber, VoucherId};

/// The trip aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    /// Opaque generated number (`TRIP-` + random token)
    pub trip_number: TripNumber,
    pub driver_name: String,
    pub driver_phone: String,
    pub vehicle_number: String,
    pub origin: String,
    pub destination: String,
    /// Vouchers settled on this trip
    pub voucher_ids: Vec<VoucherId>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        driver_name: impl Into<String>,
        driver_phone: impl Into<String>,
        vehicle_number: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
        voucher_ids: Vec<VoucherId>,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TripId::new_v7(),
            trip_number: TripNumber::generate(),
            driver_name: driver_name.into(),
            driver_phone: driver_phone.into(),
            vehicle_number: vehicle_number.into(),
            origin: origin.into(),
            destination: destination.into(),
            voucher_ids,
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
