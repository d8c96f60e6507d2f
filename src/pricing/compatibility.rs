//! Component compatibility rules.
//!
//! Narrows optimizer and storage choices to what works with the selected
//! inverter and picks the default optimizer.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::models::{
    EnergyStorage, Inverter, Optimizer, OPTIMIZER_RATIO_ONE_TO_ONE, OPTIMIZER_RATIO_ONE_TO_TWO,
};

/// Above this inverter power the high-power (1:2) optimizers are offered
pub const HIGH_POWER_INVERTER_KW: Decimal = dec!(16);

/// Options that remain valid for a selected inverter
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompatibilityResult {
    pub optimizers: Vec<Optimizer>,
    pub storages: Vec<EnergyStorage>,
    pub optimizers_required: bool,
    pub show_high_power_optimizers: bool,
    pub storage_allowed: bool,
    pub default_optimizer: Option<Optimizer>,
}

/// Filter optimizers and storages for the selected inverter.
///
/// Without an inverter nothing is compatible. Grid inverters never get storage,
/// whatever the storage rows declare.
pub fn filter_compatible(
    inverter: Option<&Inverter>,
    optimizers: &[Optimizer],
    storages: &[EnergyStorage],
) -> CompatibilityResult {
    let Some(inverter) = inverter else {
        return CompatibilityResult::default();
    };

    let compatible_optimizers: Vec<Optimizer> = optimizers
        .iter()
        .filter(|o| o.is_compatible_with(inverter.id))
        .cloned()
        .collect();

    let storage_allowed = !inverter.is_grid_only();
    let compatible_storages: Vec<EnergyStorage> = if storage_allowed {
        storages
            .iter()
            .filter(|s| s.is_compatible_with(inverter.id))
            .cloned()
            .collect()
    } else {
        Vec::new()
    };

    let optimizers_required = inverter.requires_optimizers();
    let high_power = inverter.power_kw > HIGH_POWER_INVERTER_KW;

    let default_optimizer = if optimizers_required {
        default_optimizer(inverter, &compatible_optimizers).cloned()
    } else {
        None
    };

    CompatibilityResult {
        optimizers: compatible_optimizers,
        storages: compatible_storages,
        optimizers_required,
        show_high_power_optimizers: optimizers_required && high_power,
        storage_allowed,
        default_optimizer,
    }
}

/// Pick the optimizer to preselect for an inverter.
///
/// Inverters above 16 kW prefer 1:2 optimizers, smaller ones 1:1. Falls back to
/// the first candidate when no ratio matches.
pub fn default_optimizer<'a>(inverter: &Inverter, candidates: &'a [Optimizer]) -> Option<&'a Optimizer> {
    let wanted_ratio = if inverter.power_kw > HIGH_POWER_INVERTER_KW {
        OPTIMIZER_RATIO_ONE_TO_TWO
    } else {
        OPTIMIZER_RATIO_ONE_TO_ONE
    };

    candidates
        .iter()
        .find(|o| o.ratio == wanted_ratio)
        .or_else(|| candidates.first())
}
