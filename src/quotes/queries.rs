//! Database queries for saved quotes.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::models::QuoteData;
use super::QuoteStore;

/// Quote storage in the `quotes` table. The price breakdown is kept as JSONB
/// next to the flattened final price used for listings.
#[derive(Debug, Clone)]
pub struct PgQuoteStore {
    pool: PgPool,
}

impl PgQuoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuoteStore for PgQuoteStore {
    async fn save_quote(&self, quote: &QuoteData) -> Result<Uuid, AppError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO quotes (
                id, client_name, client_email, client_phone, client_address, notes,
                panel_id, panel_count, inverter_id, optimizer_id,
                mounting_system_id, storage_id,
                calculation, final_price,
                created_at, expires_at, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&quote.client.name)
        .bind(&quote.client.email)
        .bind(&quote.client.phone)
        .bind(&quote.client.address)
        .bind(&quote.client.notes)
        .bind(quote.components.panel_id)
        .bind(quote.components.panel_count)
        .bind(quote.components.inverter_id)
        .bind(quote.components.optimizer_id)
        .bind(quote.components.mounting_system_id)
        .bind(quote.components.storage_id)
        .bind(Json(&quote.calculation))
        .bind(quote.calculation.final_price)
        .bind(quote.created_at)
        .bind(quote.expires_at)
        .bind(quote.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}
