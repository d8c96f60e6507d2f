//! In-memory catalog source.
//!
//! Serves catalog rows held in memory. `StaticCatalog::sample()` is a small
//! realistic catalog used for demos (`CATALOG_SOURCE=static`) and tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::error::AppError;

use super::catalog::CatalogSource;
use super::models::{
    AccessoriesConfig, AccessoryBand, EnergyStorage, Inverter, MountingSystem, Optimizer, Panel,
    INVERTER_TYPE_GRID, INVERTER_TYPE_HYBRID, OPTIMIZER_RATIO_ONE_TO_ONE,
    OPTIMIZER_RATIO_ONE_TO_TWO,
};

// Stable IDs for the sample catalog
pub const JINKO_420_ID: Uuid = Uuid::from_u128(0x6a1c_0001_0000_4000_8000_000000000001);
pub const LONGI_430_ID: Uuid = Uuid::from_u128(0x6a1c_0001_0000_4000_8000_000000000002);
pub const TRINA_445_ID: Uuid = Uuid::from_u128(0x6a1c_0001_0000_4000_8000_000000000003);

pub const FRONIUS_SYMO_ID: Uuid = Uuid::from_u128(0x6a1c_0002_0000_4000_8000_000000000001);
pub const HUAWEI_10K_ID: Uuid = Uuid::from_u128(0x6a1c_0002_0000_4000_8000_000000000002);
pub const SOLAREDGE_10K_ID: Uuid = Uuid::from_u128(0x6a1c_0002_0000_4000_8000_000000000003);
pub const SOLAREDGE_17K_ID: Uuid = Uuid::from_u128(0x6a1c_0002_0000_4000_8000_000000000004);
pub const SOLAREDGE_HUB_ID: Uuid = Uuid::from_u128(0x6a1c_0002_0000_4000_8000_000000000005);

pub const SOLAREDGE_S440_ID: Uuid = Uuid::from_u128(0x6a1c_0003_0000_4000_8000_000000000001);
pub const SOLAREDGE_P1100_ID: Uuid = Uuid::from_u128(0x6a1c_0003_0000_4000_8000_000000000002);
pub const HUAWEI_450P_ID: Uuid = Uuid::from_u128(0x6a1c_0003_0000_4000_8000_000000000003);

pub const PITCHED_ROOF_ID: Uuid = Uuid::from_u128(0x6a1c_0004_0000_4000_8000_000000000001);
pub const FLAT_ROOF_ID: Uuid = Uuid::from_u128(0x6a1c_0004_0000_4000_8000_000000000002);
pub const GROUND_MOUNT_ID: Uuid = Uuid::from_u128(0x6a1c_0004_0000_4000_8000_000000000003);

pub const HUAWEI_LUNA_ID: Uuid = Uuid::from_u128(0x6a1c_0005_0000_4000_8000_000000000001);
pub const SOLAREDGE_BATTERY_ID: Uuid = Uuid::from_u128(0x6a1c_0005_0000_4000_8000_000000000002);

/// Catalog rows kept in memory
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    pub panels: Vec<Panel>,
    pub inverters: Vec<Inverter>,
    pub optimizers: Vec<Optimizer>,
    pub mounting_systems: Vec<MountingSystem>,
    pub energy_storages: Vec<EnergyStorage>,
    pub accessories: AccessoriesConfig,
}

impl StaticCatalog {
    /// Sample catalog with a few common products
    pub fn sample() -> Self {
        Self {
            panels: vec![
                panel(JINKO_420_ID, "Jinko", "Tiger Neo 420", dec!(420), dec!(520)),
                panel(LONGI_430_ID, "Longi", "Hi-MO 6 430", dec!(430), dec!(560)),
                panel(TRINA_445_ID, "Trina", "Vertex S+ 445", dec!(445), dec!(610)),
            ],
            inverters: vec![
                inverter(
                    FRONIUS_SYMO_ID,
                    "Fronius",
                    "Symo 8.2-3-M",
                    dec!(8.2),
                    dec!(7800),
                    &[INVERTER_TYPE_GRID],
                    None,
                ),
                inverter(
                    HUAWEI_10K_ID,
                    "Huawei",
                    "SUN2000-10KTL-M1",
                    dec!(10),
                    dec!(8900),
                    &[INVERTER_TYPE_HYBRID],
                    Some(vec![HUAWEI_LUNA_ID]),
                ),
                inverter(
                    SOLAREDGE_10K_ID,
                    "SolarEdge",
                    "SE10K",
                    dec!(10),
                    dec!(9200),
                    &[INVERTER_TYPE_GRID],
                    None,
                ),
                inverter(
                    SOLAREDGE_17K_ID,
                    "SolarEdge",
                    "SE17K",
                    dec!(17),
                    dec!(12400),
                    &[INVERTER_TYPE_GRID],
                    None,
                ),
                inverter(
                    SOLAREDGE_HUB_ID,
                    "SolarEdge",
                    "Home Hub SE8K",
                    dec!(8),
                    dec!(11500),
                    &[INVERTER_TYPE_HYBRID],
                    Some(vec![SOLAREDGE_BATTERY_ID]),
                ),
            ],
            optimizers: vec![
                Optimizer {
                    id: SOLAREDGE_S440_ID,
                    manufacturer: "SolarEdge".to_string(),
                    model: "S440".to_string(),
                    price: dec!(210),
                    ratio: OPTIMIZER_RATIO_ONE_TO_ONE.to_string(),
                    compatible_inverter_ids: vec![SOLAREDGE_10K_ID, SOLAREDGE_17K_ID, SOLAREDGE_HUB_ID],
                },
                Optimizer {
                    id: SOLAREDGE_P1100_ID,
                    manufacturer: "SolarEdge".to_string(),
                    model: "P1100".to_string(),
                    price: dec!(340),
                    ratio: OPTIMIZER_RATIO_ONE_TO_TWO.to_string(),
                    compatible_inverter_ids: vec![SOLAREDGE_17K_ID],
                },
                Optimizer {
                    id: HUAWEI_450P_ID,
                    manufacturer: "Huawei".to_string(),
                    model: "SUN2000-450W-P2".to_string(),
                    price: dec!(190),
                    ratio: OPTIMIZER_RATIO_ONE_TO_ONE.to_string(),
                    compatible_inverter_ids: vec![HUAWEI_10K_ID],
                },
            ],
            mounting_systems: vec![
                mounting(PITCHED_ROOF_ID, "pitched", "Pitched roof rails", dec!(450)),
                mounting(FLAT_ROOF_ID, "flat", "Flat roof ballast", dec!(650)),
                mounting(GROUND_MOUNT_ID, "ground", "Ground mount", dec!(900)),
            ],
            energy_storages: vec![
                EnergyStorage {
                    id: HUAWEI_LUNA_ID,
                    manufacturer: "Huawei".to_string(),
                    model: "LUNA2000-10-S0".to_string(),
                    capacity_kwh: dec!(10),
                    price: dec!(21000),
                    compatible_inverter_ids: vec![HUAWEI_10K_ID],
                },
                EnergyStorage {
                    id: SOLAREDGE_BATTERY_ID,
                    manufacturer: "SolarEdge".to_string(),
                    model: "Home Battery 9.7".to_string(),
                    capacity_kwh: dec!(9.7),
                    price: dec!(24500),
                    compatible_inverter_ids: vec![SOLAREDGE_HUB_ID],
                },
            ],
            accessories: AccessoriesConfig::new(vec![
                band(dec!(0), dec!(5), dec!(2500)),
                band(dec!(5.001), dec!(10), dec!(3500)),
                band(dec!(10.001), dec!(20), dec!(5000)),
                band(dec!(20.001), dec!(50), dec!(8000)),
            ]),
        }
    }
}

fn panel(id: Uuid, manufacturer: &str, model: &str, power_w: Decimal, price: Decimal) -> Panel {
    Panel {
        id,
        manufacturer: manufacturer.to_string(),
        model: model.to_string(),
        power_w,
        price,
    }
}

fn inverter(
    id: Uuid,
    manufacturer: &str,
    model: &str,
    power_kw: Decimal,
    price: Decimal,
    types: &[&str],
    compatible_storage_ids: Option<Vec<Uuid>>,
) -> Inverter {
    Inverter {
        id,
        manufacturer: manufacturer.to_string(),
        model: model.to_string(),
        power_kw,
        price,
        types: types.iter().map(|t| t.to_string()).collect(),
        compatible_storage_ids,
    }
}

fn mounting(id: Uuid, mount_type: &str, name: &str, price_per_kw: Decimal) -> MountingSystem {
    MountingSystem {
        id,
        mount_type: mount_type.to_string(),
        name: name.to_string(),
        price_per_kw,
    }
}

fn band(min_power: Decimal, max_power: Decimal, price: Decimal) -> AccessoryBand {
    AccessoryBand {
        min_power,
        max_power,
        price,
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn list_panels(&self) -> Result<Vec<Panel>, AppError> {
        Ok(self.panels.clone())
    }

    async fn list_inverters(&self, type_filter: Option<&str>) -> Result<Vec<Inverter>, AppError> {
        Ok(self
            .inverters
            .iter()
            .filter(|i| type_filter.map_or(true, |tag| i.has_type(tag)))
            .cloned()
            .collect())
    }

    async fn list_optimizers(&self, inverter_id: Option<Uuid>) -> Result<Vec<Optimizer>, AppError> {
        Ok(self
            .optimizers
            .iter()
            .filter(|o| inverter_id.map_or(true, |id| o.is_compatible_with(id)))
            .cloned()
            .collect())
    }

    async fn list_mounting_systems(&self) -> Result<Vec<MountingSystem>, AppError> {
        Ok(self.mounting_systems.clone())
    }

    async fn list_energy_storages(
        &self,
        inverter_id: Option<Uuid>,
    ) -> Result<Vec<EnergyStorage>, AppError> {
        Ok(self
            .energy_storages
            .iter()
            .filter(|s| inverter_id.map_or(true, |id| s.is_compatible_with(id)))
            .cloned()
            .collect())
    }

    async fn get_accessories_config(&self) -> Result<AccessoriesConfig, AppError> {
        Ok(self.accessories.clone())
    }
}
