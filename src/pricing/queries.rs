//! Database queries for the component catalog.
//!
//! Runtime-checked sqlx queries against the catalog tables maintained by the
//! admin application.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::catalog::CatalogSource;
use super::models::{
    AccessoriesConfig, AccessoryBand, EnergyStorage, Inverter, MountingSystem, Optimizer, Panel,
};

/// Catalog backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogSource for PgCatalog {
    async fn list_panels(&self) -> Result<Vec<Panel>, AppError> {
        let panels = sqlx::query_as::<_, Panel>(
            r#"
            SELECT id, manufacturer, model, power_w, price
            FROM catalog_panels
            ORDER BY manufacturer, power_w
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(panels)
    }

    async fn list_inverters(&self, type_filter: Option<&str>) -> Result<Vec<Inverter>, AppError> {
        let inverters = sqlx::query_as::<_, Inverter>(
            r#"
            SELECT id, manufacturer, model, power_kw, price, types, compatible_storage_ids
            FROM catalog_inverters
            WHERE ($1::text IS NULL OR $1 = ANY(types))
            ORDER BY manufacturer, power_kw
            "#,
        )
        .bind(type_filter)
        .fetch_all(&self.pool)
        .await?;

        Ok(inverters)
    }

    async fn list_optimizers(&self, inverter_id: Option<Uuid>) -> Result<Vec<Optimizer>, AppError> {
        let optimizers = sqlx::query_as::<_, Optimizer>(
            r#"
            SELECT id, manufacturer, model, price, ratio, compatible_inverter_ids
            FROM catalog_optimizers
            WHERE ($1::uuid IS NULL OR $1 = ANY(compatible_inverter_ids))
            ORDER BY manufacturer, model
            "#,
        )
        .bind(inverter_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(optimizers)
    }

    async fn list_mounting_systems(&self) -> Result<Vec<MountingSystem>, AppError> {
        let systems = sqlx::query_as::<_, MountingSystem>(
            r#"
            SELECT id, mount_type, name, price_per_kw
            FROM catalog_mounting_systems
            ORDER BY mount_type, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(systems)
    }

    async fn list_energy_storages(
        &self,
        inverter_id: Option<Uuid>,
    ) -> Result<Vec<EnergyStorage>, AppError> {
        let storages = sqlx::query_as::<_, EnergyStorage>(
            r#"
            SELECT id, manufacturer, model, capacity_kwh, price, compatible_inverter_ids
            FROM catalog_energy_storages
            WHERE ($1::uuid IS NULL OR $1 = ANY(compatible_inverter_ids))
            ORDER BY manufacturer, capacity_kwh
            "#,
        )
        .bind(inverter_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(storages)
    }

    async fn get_accessories_config(&self) -> Result<AccessoriesConfig, AppError> {
        let bands = sqlx::query_as::<_, AccessoryBand>(
            r#"
            SELECT min_power, max_power, price
            FROM catalog_accessory_bands
            ORDER BY min_power
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(AccessoriesConfig::new(bands))
    }
}
