//! PostgreSQL shipment store

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{BiltyNumber, DomainPort, PortError, ShipmentId};
use domain_shipment::{DeliveryStatus, PaymentStatus, Shipment, ShipmentQuery, ShipmentStore};

use super::{decode_doc, encode_doc};
use crate::error::DatabaseError;

/// PostgreSQL-backed implementation of `ShipmentStore`
#[derive(Debug, Clone)]
pub struct PgShipmentStore {
    pool: PgPool,
}

impl PgShipmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn payment_status_str(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Paid => "paid",
        PaymentStatus::Unpaid => "unpaid",
    }
}

fn delivery_status_str(status: DeliveryStatus) -> &'static str {
    match status {
        DeliveryStatus::Pending => "pending",
        DeliveryStatus::Delivered => "delivered",
        DeliveryStatus::Returned => "returned",
    }
}

impl DomainPort for PgShipmentStore {}

#[async_trait]
impl ShipmentStore for PgShipmentStore {
    #[instrument(skip(self, shipment), fields(bilty = %shipment.bilty_number))]
    async fn insert(&self, shipment: &Shipment) -> Result<(), PortError> {
        debug!("inserting shipment");
        sqlx::query(
            r#"
            INSERT INTO shipments
                (id, bilty_number, payment_status, delivery_status, voucher_made,
                 created_at, updated_at, doc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(shipment.id.as_uuid())
        .bind(shipment.bilty_number.as_str())
        .bind(payment_status_str(shipment.payment_status))
        .bind(delivery_status_str(shipment.delivery_status))
        .bind(shipment.voucher_made)
        .bind(shipment.created_at)
        .bind(shipment.updated_at)
        .bind(encode_doc(shipment)?)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    #[instrument(skip(self, shipment), fields(bilty = %shipment.bilty_number))]
    async fn update(&self, shipment: &Shipment) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE shipments
            SET payment_status = $2,
                delivery_status = $3,
                voucher_made = $4,
                updated_at = $5,
                doc = $6
            WHERE id = $1
            "#,
        )
        .bind(shipment.id.as_uuid())
        .bind(payment_status_str(shipment.payment_status))
        .bind(delivery_status_str(shipment.delivery_status))
        .bind(shipment.voucher_made)
        .bind(shipment.updated_at)
        .bind(encode_doc(shipment)?)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Shipment", shipment.id));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: ShipmentId) -> Result<Option<Shipment>, PortError> {
        let row = sqlx::query("SELECT doc FROM shipments WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        row.map(|r| decode_doc(r.get("doc"))).transpose()
    }

    async fn find_by_bilty_number(
        &self,
        number: &BiltyNumber,
    ) -> Result<Option<Shipment>, PortError> {
        let row = sqlx::query("SELECT doc FROM shipments WHERE bilty_number = $1")
            .bind(number.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        row.map(|r| decode_doc(r.get("doc"))).transpose()
    }

    #[instrument(skip(self))]
    async fn find(&self, query: ShipmentQuery) -> Result<Vec<Shipment>, PortError> {
        let rows = sqlx::query(
            r#"
            SELECT doc FROM shipments
            WHERE ($1::text IS NULL OR payment_status = $1)
              AND ($2::text IS NULL OR delivery_status = $2)
              AND ($3::boolean IS NULL OR voucher_made = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(query.payment_status.map(payment_status_str))
        .bind(query.delivery_status.map(delivery_status_str))
        .bind(query.voucher_made)
        .bind(query.limit.map(|l| l as i64))
        .bind(query.offset.unwrap_or(0) as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter().map(|r| decode_doc(r.get("doc"))).collect()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ShipmentId) -> Result<(), PortError> {
        let result = sqlx::query("DELETE FROM shipments WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Shipment", id));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn set_voucher_made(&self, ids: &[ShipmentId], value: bool) -> Result<(), PortError> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let result = sqlx::query(
            r#"
            UPDATE shipments
            SET voucher_made = $2,
                doc = jsonb_set(doc, '{voucher_made}', to_jsonb($2::boolean))
            WHERE id = ANY($1)
            "#,
        )
        .bind(&uuids)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() != ids.len() as u64 {
            return Err(PortError::not_found(
                "Shipment",
                "one or more shipments in the batch",
            ));
        }
        Ok(())
    }
}
