//! Quote API routes

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::pricing::requests::MarginRequest;
use crate::pricing::services::{calculate_selection_price, SelectedComponents};
use crate::AppState;

use super::models::{ClientContact, QuoteDraft};
use super::services::{save_quote, SaveQuoteResult};

/// Request to save a quote. The price is recalculated server-side from the
/// selection; client-side totals are never trusted.
#[derive(Debug, Deserialize)]
pub struct SaveQuoteRequest {
    pub client: ClientContact,
    #[serde(flatten)]
    pub components: SelectedComponents,
    #[serde(flatten)]
    pub margin: MarginRequest,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/quotes", post(create_quote))
}

async fn create_quote(
    State(state): State<AppState>,
    Json(request): Json<SaveQuoteRequest>,
) -> Result<(StatusCode, Json<SaveQuoteResult>)> {
    if let Err(errors) = request.client.validate() {
        return Err(AppError::Validation(errors.join("; ")));
    }

    let margin = request.margin.to_margin_input()?;
    let calculation =
        calculate_selection_price(&state.catalog, &request.components, margin).await?;

    let draft = QuoteDraft {
        client: request.client,
        components: request.components,
        calculation,
    };
    let result = save_quote(state.quotes.as_ref(), draft).await;

    let status = if result.success {
        StatusCode::CREATED
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::static_catalog::*;
    use crate::quotes::testing::{FailingQuoteStore, MemoryQuoteStore};
    use crate::quotes::models::QuoteStatus;
    use crate::test_support::{post_json, state_with_store};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn quote_body() -> serde_json::Value {
        serde_json::json!({
            "client": {
                "name": "Anna Nowak",
                "email": "anna@example.com",
                "address": "ul. Polna 3, Poznań"
            },
            "panel_id": TRINA_445_ID,
            "panel_count": 12,
            "inverter_id": SOLAREDGE_10K_ID,
            "optimizer_id": SOLAREDGE_S440_ID,
            "mounting_system_id": FLAT_ROOF_ID,
            "margin_type": "percent",
            "margin_value": 18
        })
    }

    #[tokio::test]
    async fn test_create_quote() {
        let store = Arc::new(MemoryQuoteStore::default());
        let state = state_with_store(store.clone());

        let (status, body) = post_json(state, "/api/quotes", quote_body()).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert!(body["id"].is_string());
        assert!(body["expires_at"].is_string());

        let saved = store.saved.lock().await;
        assert_eq!(saved.len(), 1);
        let quote = &saved[0].1;
        assert_eq!(quote.status, QuoteStatus::Active);
        assert_eq!(quote.client.name, "Anna Nowak");
        // 12 x 445 W = 5.34 kWp
        assert_eq!(quote.calculation.panels_price, dec!(7320));
        assert_eq!(quote.calculation.optimizers_price, dec!(2520));
        assert_eq!(quote.calculation.mounting_price, dec!(3471));
        assert_eq!(quote.calculation.base_price, dec!(26011));
        assert_eq!(quote.calculation.margin_amount, dec!(4682));
    }

    #[tokio::test]
    async fn test_create_quote_store_failure() {
        let state = state_with_store(Arc::new(FailingQuoteStore));

        let (status, body) = post_json(state, "/api/quotes", quote_body()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("disk full"));
    }

    #[tokio::test]
    async fn test_create_quote_requires_contact() {
        let store = Arc::new(MemoryQuoteStore::default());
        let mut body = quote_body();
        body["client"] = serde_json::json!({ "name": "" });

        let (status, response) = post_json(state_with_store(store.clone()), "/api/quotes", body).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response["error_type"], "validation_error");
        assert!(store.saved.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_quote_rejects_oversized_margin() {
        let store = Arc::new(MemoryQuoteStore::default());
        let mut body = quote_body();
        body["margin_value"] = serde_json::json!(1e26);

        let (status, response) = post_json(state_with_store(store.clone()), "/api/quotes", body).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response["error_type"], "validation_error");
        assert!(store.saved.lock().await.is_empty());
    }
}
