//! Pricing engine for solar installations.
//!
//! Filters components by compatibility and turns a bill of materials into a
//! base price, margin and commission. The surrounding admin application calls
//! it over HTTP/JSON.

pub mod calculators;
pub mod catalog;
pub mod compatibility;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod static_catalog;

// Re-export commonly used items
pub use calculators::{calculate_price, round_money, MarginPercent, PriceCalculation};
pub use catalog::{Catalog, CatalogSource};
pub use compatibility::{filter_compatible, CompatibilityResult};
pub use queries::PgCatalog;
pub use routes::router;
pub use services::PricingError;
pub use static_catalog::StaticCatalog;
