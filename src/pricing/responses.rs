//! Response DTOs for pricing API endpoints.

use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::PriceCalculation;

/// Money value for JSON responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_string(),
        }
    }
}

/// Response for a price calculation
#[derive(Debug, Clone, Serialize)]
pub struct PriceCalculationResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub installed_power_kw: Decimal,
    pub panels_price: MoneyResponse,
    pub inverter_price: MoneyResponse,
    pub optimizers_price: MoneyResponse,
    pub mounting_price: MoneyResponse,
    pub storage_price: MoneyResponse,
    pub accessories_price: MoneyResponse,
    pub base_price: MoneyResponse,
    #[serde(with = "rust_decimal::serde::str")]
    pub margin_percent: Decimal,
    pub margin_amount: MoneyResponse,
    pub final_price: MoneyResponse,
    pub commission: MoneyResponse,
}

impl PriceCalculationResponse {
    pub fn from_calculation(calc: &PriceCalculation, currency: &str) -> Self {
        Self {
            installed_power_kw: calc.installed_power_kw,
            panels_price: MoneyResponse::new(calc.panels_price, currency),
            inverter_price: MoneyResponse::new(calc.inverter_price, currency),
            optimizers_price: MoneyResponse::new(calc.optimizers_price, currency),
            mounting_price: MoneyResponse::new(calc.mounting_price, currency),
            storage_price: MoneyResponse::new(calc.storage_price, currency),
            accessories_price: MoneyResponse::new(calc.accessories_price, currency),
            base_price: MoneyResponse::new(calc.base_price, currency),
            margin_percent: calc.margin,
            margin_amount: MoneyResponse::new(calc.margin_amount, currency),
            final_price: MoneyResponse::new(calc.final_price, currency),
            commission: MoneyResponse::new(calc.commission, currency),
        }
    }
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
