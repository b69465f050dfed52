//! PostgreSQL customer store

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use core_kernel::{CustomerId, DomainPort, PortError};
use domain_customer::{Customer, CustomerQuery, CustomerStore};

use super::{decode_doc, encode_doc};
use crate::error::DatabaseError;

/// PostgreSQL-backed implementation of `CustomerStore`
#[derive(Debug, Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgCustomerStore {}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    #[instrument(skip(self, customer), fields(customer = %customer.id))]
    async fn insert(&self, customer: &Customer) -> Result<(), PortError> {
        debug!("inserting customer");
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, phone, created_at, updated_at, doc)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(customer.id.as_uuid())
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .bind(encode_doc(customer)?)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    #[instrument(skip(self, customer), fields(customer = %customer.id))]
    async fn update(&self, customer: &Customer) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = $2, phone = $3, updated_at = $4, doc = $5
            WHERE id = $1
            "#,
        )
        .bind(customer.id.as_uuid())
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(customer.updated_at)
        .bind(encode_doc(customer)?)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Customer", customer.id));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, PortError> {
        let row = sqlx::query("SELECT doc FROM customers WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        row.map(|r| decode_doc(r.get("doc"))).transpose()
    }

    async fn find_by_name_phone(
        &self,
        name: &str,
        phone: &str,
    ) -> Result<Option<Customer>, PortError> {
        let row = sqlx::query(
            "SELECT doc FROM customers WHERE name = $1 AND phone = $2 ORDER BY created_at LIMIT 1",
        )
        .bind(name)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        row.map(|r| decode_doc(r.get("doc"))).transpose()
    }

    #[instrument(skip(self))]
    async fn find(&self, query: CustomerQuery) -> Result<Vec<Customer>, PortError> {
        let rows = sqlx::query(
            r#"
            SELECT doc FROM customers
            WHERE ($1::text IS NULL OR name = $1)
              AND ($2::text IS NULL OR phone = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(query.name)
        .bind(query.phone)
        .bind(query.limit.map(|l| l as i64))
        .bind(query.offset.unwrap_or(0) as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter().map(|r| decode_doc(r.get("doc"))).collect()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: CustomerId) -> Result<(), PortError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Customer", id));
        }
        Ok(())
    }
}
