//! PostgreSQL trip store

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use core_kernel::{DomainPort, PortError, TripId};
use domain_trip::{Trip, TripQuery, TripStore};

use super::{decode_doc, encode_doc};
use crate::error::DatabaseError;

/// PostgreSQL-backed implementation of `TripStore`
#[derive(Debug, Clone)]
pub struct PgTripStore {
    pool: PgPool,
}

impl PgTripStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgTripStore {}

#[async_trait]
impl TripStore for PgTripStore {
    #[instrument(skip(self, trip), fields(trip = %trip.trip_number))]
    async fn insert(&self, trip: &Trip) -> Result<(), PortError> {
        debug!("inserting trip");
        sqlx::query(
            r#"
            INSERT INTO trips (id, trip_number, created_at, updated_at, doc)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(trip.id.as_uuid())
        .bind(trip.trip_number.as_str())
        .bind(trip.created_at)
        .bind(trip.updated_at)
        .bind(encode_doc(trip)?)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn find_by_id(&self, id: TripId) -> Result<Option<Trip>, PortError> {
        let row = sqlx::query("SELECT doc FROM trips WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        row.map(|r| decode_doc(r.get("doc"))).transpose()
    }

    #[instrument(skip(self))]
    async fn find(&self, query: TripQuery) -> Result<Vec<Trip>, PortError> {
        let rows = sqlx::query(
            r#"
            SELECT doc FROM trips
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(query.limit.map(|l| l as i64))
        .bind(query.offset.unwrap_or(0) as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter().map(|r| decode_doc(r.get("doc"))).collect()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: TripId) -> Result<(), PortError> {
        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Trip", id));
        }
        Ok(())
    }
}
