//! Request DTOs for pricing API endpoints.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;

use super::calculators::{MarginInput, MarginPercent};
use super::services::SelectedComponents;

/// Query for the compatibility endpoint
#[derive(Debug, Deserialize)]
pub struct CompatibilityQuery {
    #[serde(default)]
    pub inverter_id: Option<Uuid>,
}

/// How `margin_value` is to be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginType {
    #[default]
    Percent,
    Amount,
}

/// Largest margin percent accepted from a form
pub const MAX_MARGIN_PERCENT: Decimal = dec!(1000);

/// Largest absolute margin accepted from a form, in currency units
pub const MAX_MARGIN_AMOUNT: Decimal = dec!(1000000000);

/// Margin as entered in the calculator form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarginRequest {
    #[serde(default)]
    pub margin_type: MarginType,
    /// Missing means no margin
    #[serde(default)]
    pub margin_value: Option<Decimal>,
}

impl MarginRequest {
    /// Convert to the calculator's margin input.
    ///
    /// Negative margins and margins above the form limits are rejected.
    pub fn to_margin_input(&self) -> Result<MarginInput, AppError> {
        let value = self.margin_value.unwrap_or(Decimal::ZERO);
        if value < Decimal::ZERO {
            return Err(AppError::Validation("margin_value must not be negative".to_string()));
        }

        match self.margin_type {
            MarginType::Percent if value > MAX_MARGIN_PERCENT => Err(AppError::Validation(format!(
                "margin_value must not exceed {}%",
                MAX_MARGIN_PERCENT
            ))),
            MarginType::Percent => Ok(MarginInput::Percent(MarginPercent::new(value))),
            MarginType::Amount if value > MAX_MARGIN_AMOUNT => Err(AppError::Validation(format!(
                "margin_value must not exceed {}",
                MAX_MARGIN_AMOUNT
            ))),
            MarginType::Amount => Ok(MarginInput::Amount(value)),
        }
    }
}

/// Request to price a component selection
#[derive(Debug, Deserialize)]
pub struct CalculatePriceRequest {
    #[serde(flatten)]
    pub components: SelectedComponents,
    #[serde(flatten)]
    pub margin: MarginRequest,
}
