//! Client quotes.
//!
//! Saving a priced selection as a quote valid for seven business days. Storage
//! sits behind [`QuoteStore`] so the service never holds a database handle
//! directly.

pub mod models;
pub mod queries;
pub mod routes;
pub mod services;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;

use models::QuoteData;

pub use queries::PgQuoteStore;
pub use routes::router;
pub use services::{save_quote, SaveQuoteResult};

/// Persistence for saved quotes
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Store the quote and return its assigned id
    async fn save_quote(&self, quote: &QuoteData) -> Result<Uuid, AppError>;
}
