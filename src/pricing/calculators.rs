//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no database access. Callers resolve the
//! catalog rows first (see `services`) and hand them over as a
//! [`ComponentSelection`].

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::models::{AccessoriesConfig, EnergyStorage, Inverter, MountingSystem, Optimizer, Panel};

/// Share of the margin paid out as sales commission
pub const COMMISSION_RATE: Decimal = dec!(0.8);

/// Whole currency units
const MONEY_PLACES: u32 = 0;

const WATTS_PER_KILOWATT: Decimal = dec!(1000);
const ONE_HUNDRED: Decimal = dec!(100);

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use solarquote_web::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Margin expressed as a percentage of the base price.
///
/// Construction from `f64` coerces NaN and infinities to zero. Finite values
/// outside `Decimal` range are refused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarginPercent(Decimal);

impl MarginPercent {
    pub const ZERO: MarginPercent = MarginPercent(Decimal::ZERO);

    pub fn new(percent: Decimal) -> Self {
        Self(percent)
    }

    pub fn from_f64(percent: f64) -> Option<Self> {
        if !percent.is_finite() {
            return Some(Self::ZERO);
        }
        Decimal::from_f64(percent).map(Self)
    }

    /// Convert an absolute margin into the equivalent percent of `base_price`.
    ///
    /// A zero base price yields 0%.
    pub fn from_amount(amount: Decimal, base_price: Decimal) -> Self {
        if base_price.is_zero() {
            return Self::ZERO;
        }
        Self(amount / base_price * ONE_HUNDRED)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Unrounded margin amount on top of `base_price`
    pub fn amount_of(&self, base_price: Decimal) -> Decimal {
        base_price * self.0 / ONE_HUNDRED
    }
}

/// How the reseller entered the margin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginInput {
    Percent(MarginPercent),
    Amount(Decimal),
}

/// Fully resolved bill of materials for one installation
#[derive(Debug, Clone, Copy)]
pub struct ComponentSelection<'a> {
    pub panel: &'a Panel,
    pub panel_count: i32,
    pub inverter: &'a Inverter,
    pub optimizer: Option<&'a Optimizer>,
    pub mounting: &'a MountingSystem,
    pub storage: Option<&'a EnergyStorage>,
}

/// Price breakdown for one installation. All money in whole currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCalculation {
    pub installed_power_kw: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub panels_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub inverter_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub optimizers_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub mounting_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub storage_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub accessories_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    /// Margin in percent of `base_price`
    pub margin: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub margin_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub final_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub commission: Decimal,
}

/// Installed power in kWp
pub fn installed_power_kw(panel: &Panel, panel_count: i32) -> Decimal {
    panel.power_w * Decimal::from(panel_count) / WATTS_PER_KILOWATT
}

/// Look up the accessories price for the installed power. No matching band
/// prices accessories at zero.
pub fn accessories_price_for(config: &AccessoriesConfig, power_kw: Decimal) -> Decimal {
    config
        .band_for(power_kw)
        .map(|band| band.price)
        .unwrap_or(Decimal::ZERO)
}

/// Calculate the full price breakdown for a component selection.
///
/// Each line is rounded exactly once and the totals are built from the
/// rounded lines, so `base_price` is always the sum of the six lines and
/// `final_price - base_price == margin_amount`.
///
/// The optimizer line assumes one optimizer per panel regardless of ratio.
pub fn calculate_price(
    selection: &ComponentSelection<'_>,
    accessories: &AccessoriesConfig,
    margin: MarginPercent,
) -> PriceCalculation {
    let count = Decimal::from(selection.panel_count);
    let power_kw = installed_power_kw(selection.panel, selection.panel_count);

    let panels_price = round_money(selection.panel.price * count, MONEY_PLACES);
    let inverter_price = round_money(selection.inverter.price, MONEY_PLACES);
    let optimizers_price = selection
        .optimizer
        .map(|o| round_money(o.price * count, MONEY_PLACES))
        .unwrap_or(Decimal::ZERO);
    let mounting_price = round_money(selection.mounting.price_per_kw * power_kw, MONEY_PLACES);
    let storage_price = selection
        .storage
        .map(|s| round_money(s.price, MONEY_PLACES))
        .unwrap_or(Decimal::ZERO);
    let accessories_price = round_money(accessories_price_for(accessories, power_kw), MONEY_PLACES);

    let base_price = panels_price
        + inverter_price
        + optimizers_price
        + mounting_price
        + storage_price
        + accessories_price;

    let margin_amount = round_money(margin.amount_of(base_price), MONEY_PLACES);
    let final_price = base_price + margin_amount;
    let commission = round_money(margin_amount * COMMISSION_RATE, MONEY_PLACES);

    PriceCalculation {
        installed_power_kw: power_kw,
        panels_price,
        inverter_price,
        optimizers_price,
        mounting_price,
        storage_price,
        accessories_price,
        base_price,
        margin: margin.value(),
        margin_amount,
        final_price,
        commission,
    }
}

/// Calculate with a margin given either as percent or as an absolute amount.
///
/// An absolute margin is converted against the base price first, so the
/// result carries the equivalent percent.
pub fn calculate_with_margin(
    selection: &ComponentSelection<'_>,
    accessories: &AccessoriesConfig,
    margin: MarginInput,
) -> PriceCalculation {
    match margin {
        MarginInput::Percent(percent) => calculate_price(selection, accessories, percent),
        MarginInput::Amount(amount) => {
            let base_price = calculate_price(selection, accessories, MarginPercent::ZERO).base_price;
            let percent = MarginPercent::from_amount(amount, base_price);
            calculate_price(selection, accessories, percent)
        }
    }
}
