//! Trip DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_trip::{NewTrip, Trip};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTripRequest {
    #[validate(length(min = 1))]
    pub driver_name: String,
    pub driver_phone: String,
    #[validate(length(min = 1))]
    pub vehicle_number: String,
    pub origin: String,
    pub destination: String,
    #[validate(length(min = 1))]
    pub voucher_ids: Vec<Uuid>,
}

impl CreateTripRequest {
    pub fn into_domain(self) -> NewTrip {
        NewTrip {
            driver_name: self.driver_name,
            driver_phone: self.driver_phone,
            vehicle_number: self.vehicle_number,
            origin: self.origin,
            destination: self.destination,
            voucher_ids: self.voucher_ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// List filters, all optional
#[derive(Debug, Default, Deserialize)]
pub struct TripListParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct TripResponse {
    pub id: Uuid,
    pub trip_number: String,
    pub driver_name: String,
    pub driver_phone: String,
    pub vehicle_number: String,
    pub origin: String,
    pub destination: String,
    pub voucher_ids: Vec<Uuid>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Trip> for TripResponse {
    fn from(t: Trip) -> Self {
        Self {
            id: t.id.into(),
            trip_number: t.trip_number.to_string(),
            driver_name: t.driver_name,
            driver_phone: t.driver_phone,
            vehicle_number: t.vehicle_number,
            origin: t.origin,
            destination: t.destination,
            voucher_ids: t.voucher_ids.into_iter().map(Into::into).collect(),
            created_by: t.created_by,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}
