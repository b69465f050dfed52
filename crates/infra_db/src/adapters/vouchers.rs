//! PostgreSQL voucher store
//!
//! `mark_trip_made` runs as a guarded batch update inside a transaction:
//! only rows still carrying `trip_made = false` are touched, and the whole
//! batch rolls back if any voucher was grabbed by a concurrent trip.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{CustomerId, DomainPort, PortError, VoucherId, VoucherNumber};
use domain_voucher::{Voucher, VoucherQuery, VoucherStatus, VoucherStore};

use super::{decode_doc, encode_doc};
use crate::error::DatabaseError;

/// PostgreSQL-backed implementation of `VoucherStore`
#[derive(Debug, Clone)]
pub struct PgVoucherStore {
    pool: PgPool,
}

impl PgVoucherStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn status_str(status: VoucherStatus) -> &'static str {
    match status {
        VoucherStatus::Paid => "paid",
        VoucherStatus::Unpaid => "unpaid",
        VoucherStatus::Partial => "partial",
    }
}

impl DomainPort for PgVoucherStore {}

#[async_trait]
impl VoucherStore for PgVoucherStore {
    #[instrument(skip(self, voucher), fields(voucher = %voucher.voucher_number))]
    async fn insert(&self, voucher: &Voucher) -> Result<(), PortError> {
        debug!("inserting voucher");
        sqlx::query(
            r#"
            INSERT INTO vouchers
                (id, voucher_number, customer_id, status, trip_made,
                 created_at, updated_at, doc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(voucher.id.as_uuid())
        .bind(voucher.voucher_number.as_str())
        .bind(voucher.customer_id.as_uuid())
        .bind(status_str(voucher.status))
        .bind(voucher.trip_made)
        .bind(voucher.created_at)
        .bind(voucher.updated_at)
        .bind(encode_doc(voucher)?)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    #[instrument(skip(self, voucher), fields(voucher = %voucher.voucher_number))]
    async fn update(&self, voucher: &Voucher) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE vouchers
            SET status = $2, trip_made = $3, updated_at = $4, doc = $5
            WHERE id = $1
            "#,
        )
        .bind(voucher.id.as_uuid())
        .bind(status_str(voucher.status))
        .bind(voucher.trip_made)
        .bind(voucher.updated_at)
        .bind(encode_doc(voucher)?)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Voucher", voucher.id));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: VoucherId) -> Result<Option<Voucher>, PortError> {
        let row = sqlx::query("SELECT doc FROM vouchers WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        row.map(|r| decode_doc(r.get("doc"))).transpose()
    }

    async fn find_by_number(&self, number: &VoucherNumber) -> Result<Option<Voucher>, PortError> {
        let row = sqlx::query("SELECT doc FROM vouchers WHERE voucher_number = $1")
            .bind(number.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        row.map(|r| decode_doc(r.get("doc"))).transpose()
    }

    #[instrument(skip(self))]
    async fn find(&self, query: VoucherQuery) -> Result<Vec<Voucher>, PortError> {
        let rows = sqlx::query(
            r#"
            SELECT doc FROM vouchers
            WHERE ($1::uuid IS NULL OR customer_id = $1)
              AND ($2::boolean IS NULL OR trip_made = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(query.customer_id.map(|id: CustomerId| *id.as_uuid()))
        .bind(query.trip_made)
        .bind(query.limit.map(|l| l as i64))
        .bind(query.offset.unwrap_or(0) as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter().map(|r| decode_doc(r.get("doc"))).collect()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: VoucherId) -> Result<(), PortError> {
        let result = sqlx::query("DELETE FROM vouchers WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Voucher", id));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn mark_trip_made(&self, ids: &[VoucherId]) -> Result<(), PortError> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let result = sqlx::query(
            r#"
            UPDATE vouchers
            SET trip_made = TRUE,
                doc = jsonb_set(doc, '{trip_made}', 'true'::jsonb)
            WHERE id = ANY($1) AND trip_made = FALSE
            "#,
        )
        .bind(&uuids)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() != ids.len() as u64 {
            // Somebody else claimed at least one voucher; back out entirely.
            tx.rollback().await.map_err(DatabaseError::from)?;
            return Err(PortError::conflict(
                "one or more vouchers are already on a trip",
            ));
        }

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn clear_trip_made(&self, ids: &[VoucherId]) -> Result<(), PortError> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        sqlx::query(
            r#"
            UPDATE vouchers
            SET trip_made = FALSE,
                doc = jsonb_set(doc, '{trip_made}', 'false'::jsonb)
            WHERE id = ANY($1)
            "#,
        )
        .bind(&uuids)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }
}
