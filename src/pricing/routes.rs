//! Pricing API routes

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::error::Result;
use crate::AppState;

use super::compatibility::CompatibilityResult;
use super::requests::{CalculatePriceRequest, CompatibilityQuery};
use super::responses::PriceCalculationResponse;
use super::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pricing/compatibility", get(compatibility))
        .route("/api/pricing/calculate", post(calculate))
}

/// Optimizers and storages that fit the selected inverter
async fn compatibility(
    State(state): State<AppState>,
    Query(query): Query<CompatibilityQuery>,
) -> Result<Json<CompatibilityResult>> {
    let result = services::compatibility_for(&state.catalog, query.inverter_id).await?;
    Ok(Json(result))
}

/// Price breakdown for a component selection
async fn calculate(
    State(state): State<AppState>,
    Json(request): Json<CalculatePriceRequest>,
) -> Result<Json<PriceCalculationResponse>> {
    let margin = request.margin.to_margin_input()?;
    let calculation =
        services::calculate_selection_price(&state.catalog, &request.components, margin).await?;

    Ok(Json(PriceCalculationResponse::from_calculation(
        &calculation,
        &state.config.currency,
    )))
}
