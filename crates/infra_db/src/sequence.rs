//! PostgreSQL serial sequence
//!
//! Backs the `SerialSequence` port with a counters table. The upsert is a
//! single statement, so two concurrent intakes on the same scope can never
//! mint the same serial.

use async_trait::async_trait;
use sqlx::PgPool;

use core_kernel::{DomainPort, PortError, SerialSequence};

use crate::error::DatabaseError;

/// Counters-table implementation of `SerialSequence`
#[derive(Debug, Clone)]
pub struct PgSerialSequence {
    pool: PgPool,
}

impl PgSerialSequence {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgSerialSequence {}

#[async_trait]
impl SerialSequence for PgSerialSequence {
    async fn next(&self, scope: &str) -> Result<u64, PortError> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO serial_counters (scope, value)
            VALUES ($1, 1)
            ON CONFLICT (scope)
            DO UPDATE SET value = serial_counters.value + 1
            RETURNING value
            "#,
        )
        .bind(scope)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(value as u64)
    }
}
