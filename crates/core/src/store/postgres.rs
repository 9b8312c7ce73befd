//! PostgreSQL invoice store.
//!
//! Documents live whole in a JSONB `content` column. `created_by` and
//! `updated_at` are copied out into indexed columns for the owner list query.
//! Schema: `migrations/0001_invoices.sql`.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use super::{InvoiceStore, StoreResult};
use crate::document::{Invoice, InvoiceId};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceStore for PgStore {
    async fn insert(&self, mut invoice: Invoice) -> StoreResult<Invoice> {
        invoice.id = InvoiceId::generate().to_string();

        sqlx::query(
            "INSERT INTO invoices (id, created_by, content, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&invoice.id)
        .bind(&invoice.created_by)
        .bind(Json(&invoice))
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(invoice)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Invoice>> {
        let row: Option<(Json<Invoice>,)> =
            sqlx::query_as("SELECT content FROM invoices WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(Json(invoice),)| invoice))
    }

    async fn replace(&self, invoice: Invoice) -> StoreResult<Option<Invoice>> {
        let result = sqlx::query("UPDATE invoices SET content = $2, updated_at = $3 WHERE id = $1")
            .bind(&invoice.id)
            .bind(Json(&invoice))
            .bind(invoice.updated_at)
            .execute(&self.pool)
            .await?;

        Ok((result.rows_affected() > 0).then_some(invoice))
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_owner(&self, owner: &str, limit: usize) -> StoreResult<Vec<Invoice>> {
        let rows: Vec<(Json<Invoice>,)> = sqlx::query_as(
            "SELECT content FROM invoices WHERE created_by = $1 \
             ORDER BY updated_at DESC LIMIT $2",
        )
        .bind(owner)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(Json(invoice),)| invoice).collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
