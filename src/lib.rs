//! SolarQuote web service.
//!
//! Pricing engine and quote storage for solar installation resellers.

pub mod cache;
pub mod config;
pub mod error;
pub mod pricing;
pub mod quotes;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cache::CacheStats;
use crate::config::Config;
use crate::pricing::Catalog;
use crate::quotes::QuoteStore;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub quotes: Arc<dyn QuoteStore>,
    pub config: Arc<Config>,
}

/// Build the HTTP application
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(pricing::router())
        .merge(quotes::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    catalog_cache: CacheStats,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        catalog_cache: state.catalog.cache().stats(),
    })
}
