//! Catalog models for pricing queries.
//!
//! These models use sqlx's FromRow derive for direct database deserialization.
//! Prices are stored as NUMERIC and read as `Decimal`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Inverter type tag for grid-tied inverters (no battery port)
pub const INVERTER_TYPE_GRID: &str = "grid";
/// Inverter type tag for hybrid inverters (battery capable)
pub const INVERTER_TYPE_HYBRID: &str = "hybrid";

/// One optimizer per panel
pub const OPTIMIZER_RATIO_ONE_TO_ONE: &str = "1:1";
/// One optimizer per two panels
pub const OPTIMIZER_RATIO_ONE_TO_TWO: &str = "1:2";

/// Manufacturer whose inverters only run with module-level optimizers
const OPTIMIZER_MANUFACTURER: &str = "SolarEdge";

/// PV panel from catalog_panels
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Panel {
    pub id: Uuid,
    pub manufacturer: String,
    pub model: String,
    /// Rated power in watts
    pub power_w: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

/// Inverter from catalog_inverters
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Inverter {
    pub id: Uuid,
    pub manufacturer: String,
    pub model: String,
    /// Rated AC power in kilowatts
    pub power_kw: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    /// Type tags, e.g. `grid`, `hybrid`
    pub types: Vec<String>,
    pub compatible_storage_ids: Option<Vec<Uuid>>,
}

impl Inverter {
    /// Check if the inverter carries the given type tag (case-insensitive)
    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Grid inverter without a hybrid tag, i.e. no battery can be attached
    pub fn is_grid_only(&self) -> bool {
        self.has_type(INVERTER_TYPE_GRID) && !self.has_type(INVERTER_TYPE_HYBRID)
    }

    /// SolarEdge inverters do not work without optimizers
    pub fn requires_optimizers(&self) -> bool {
        self.manufacturer.eq_ignore_ascii_case(OPTIMIZER_MANUFACTURER)
    }
}

/// Power optimizer from catalog_optimizers
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Optimizer {
    pub id: Uuid,
    pub manufacturer: String,
    pub model: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    /// "1:1" or "1:2"
    pub ratio: String,
    pub compatible_inverter_ids: Vec<Uuid>,
}

impl Optimizer {
    pub fn is_compatible_with(&self, inverter_id: Uuid) -> bool {
        self.compatible_inverter_ids.contains(&inverter_id)
    }
}

/// Mounting system from catalog_mounting_systems
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct MountingSystem {
    pub id: Uuid,
    /// Roof/ground type tag, e.g. `pitched`, `flat`, `ground`
    pub mount_type: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_per_kw: Decimal,
}

/// Battery storage from catalog_energy_storages
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct EnergyStorage {
    pub id: Uuid,
    pub manufacturer: String,
    pub model: String,
    pub capacity_kwh: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub compatible_inverter_ids: Vec<Uuid>,
}

impl EnergyStorage {
    pub fn is_compatible_with(&self, inverter_id: Uuid) -> bool {
        self.compatible_inverter_ids.contains(&inverter_id)
    }
}

/// Accessory price band from catalog_accessory_bands.
///
/// Bounds are installed power in kW, both inclusive.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct AccessoryBand {
    pub min_power: Decimal,
    pub max_power: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

impl AccessoryBand {
    pub fn contains(&self, power_kw: Decimal) -> bool {
        self.min_power <= power_kw && power_kw <= self.max_power
    }
}

/// Accessories (cabling, protection, connectors) priced by installed power
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessoriesConfig {
    pub bands: Vec<AccessoryBand>,
}

impl AccessoriesConfig {
    pub fn new(bands: Vec<AccessoryBand>) -> Self {
        Self { bands }
    }

    /// Find the band covering the installed power. Bands are checked in order.
    pub fn band_for(&self, power_kw: Decimal) -> Option<&AccessoryBand> {
        self.bands.iter().find(|band| band.contains(power_kw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn inverter(manufacturer: &str, types: &[&str]) -> Inverter {
        Inverter {
            id: Uuid::new_v4(),
            manufacturer: manufacturer.to_string(),
            model: "X".to_string(),
            power_kw: dec!(10),
            price: dec!(5000),
            types: types.iter().map(|t| t.to_string()).collect(),
            compatible_storage_ids: None,
        }
    }

    #[test]
    fn test_requires_optimizers_is_case_insensitive() {
        assert!(inverter("SolarEdge", &["grid"]).requires_optimizers());
        assert!(inverter("solaredge", &["grid"]).requires_optimizers());
        assert!(inverter("SOLAREDGE", &["hybrid"]).requires_optimizers());
        assert!(!inverter("Fronius", &["grid"]).requires_optimizers());
    }

    #[test]
    fn test_grid_only() {
        assert!(inverter("Fronius", &["grid"]).is_grid_only());
        assert!(inverter("Fronius", &["Grid"]).is_grid_only());
        assert!(!inverter("Fronius", &["hybrid"]).is_grid_only());
        assert!(!inverter("Fronius", &["grid", "hybrid"]).is_grid_only());
        assert!(!inverter("Fronius", &[]).is_grid_only());
    }

    #[test]
    fn test_accessory_band_bounds_are_inclusive() {
        let config = AccessoriesConfig::new(vec![
            AccessoryBand { min_power: dec!(0), max_power: dec!(5), price: dec!(2500) },
            AccessoryBand { min_power: dec!(5.01), max_power: dec!(10), price: dec!(3500) },
        ]);

        assert_eq!(config.band_for(dec!(0)).map(|b| b.price), Some(dec!(2500)));
        assert_eq!(config.band_for(dec!(5)).map(|b| b.price), Some(dec!(2500)));
        assert_eq!(config.band_for(dec!(10)).map(|b| b.price), Some(dec!(3500)));
        assert_eq!(config.band_for(dec!(10.5)), None);
    }
}
