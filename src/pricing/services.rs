//! Pricing service functions with catalog access.
//!
//! These functions resolve component IDs against the catalog, enforce the
//! selection rules the calculator relies on, and run the pure calculators.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::calculators::{calculate_with_margin, ComponentSelection, MarginInput, PriceCalculation};
use super::catalog::Catalog;
use super::compatibility::{filter_compatible, CompatibilityResult};
use super::models::{EnergyStorage, Inverter, MountingSystem, Optimizer, Panel};

/// Smallest installation the business quotes
pub const MIN_PANEL_COUNT: i32 = 8;

/// Pricing calculation error types
#[derive(Debug, Clone)]
pub enum PricingError {
    UnknownComponent {
        kind: String,
        id: String,
    },
    InvalidSelection {
        message: String,
        errors: Vec<String>,
    },
}

impl PricingError {
    pub fn error_type(&self) -> &'static str {
        match self {
            PricingError::UnknownComponent { .. } => "unknown_component",
            PricingError::InvalidSelection { .. } => "invalid_selection",
        }
    }

    fn unknown(kind: &str, id: Uuid) -> Self {
        PricingError::UnknownComponent {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingError::UnknownComponent { kind, id } => {
                write!(f, "No {} found with id {}", kind, id)
            }
            PricingError::InvalidSelection { message, .. } => {
                write!(f, "Invalid selection: {}", message)
            }
        }
    }
}

impl std::error::Error for PricingError {}

/// Component IDs picked in the calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedComponents {
    pub panel_id: Uuid,
    pub panel_count: i32,
    pub inverter_id: Uuid,
    #[serde(default)]
    pub optimizer_id: Option<Uuid>,
    pub mounting_system_id: Uuid,
    #[serde(default)]
    pub storage_id: Option<Uuid>,
}

/// Catalog rows behind a [`SelectedComponents`]
#[derive(Debug, Clone)]
pub struct ResolvedSelection {
    pub panel: Panel,
    pub panel_count: i32,
    pub inverter: Inverter,
    pub optimizer: Option<Optimizer>,
    pub mounting: MountingSystem,
    pub storage: Option<EnergyStorage>,
}

impl ResolvedSelection {
    pub fn as_selection(&self) -> ComponentSelection<'_> {
        ComponentSelection {
            panel: &self.panel,
            panel_count: self.panel_count,
            inverter: &self.inverter,
            optimizer: self.optimizer.as_ref(),
            mounting: &self.mounting,
            storage: self.storage.as_ref(),
        }
    }
}

/// Look up the selected components and check they fit together.
///
/// # Errors
/// * `UnknownComponent` if an ID is not in the catalog
/// * `InvalidSelection` if the panel count is below the minimum, the optimizer
///   does not fit the inverter, or storage is attached where it cannot be
pub async fn resolve_selection(
    catalog: &Catalog,
    ids: &SelectedComponents,
) -> Result<ResolvedSelection, PricingError> {
    if ids.panel_count < MIN_PANEL_COUNT {
        return Err(PricingError::InvalidSelection {
            message: format!("At least {} panels are required", MIN_PANEL_COUNT),
            errors: vec![format!("panel_count < {}", MIN_PANEL_COUNT)],
        });
    }

    let panel = catalog
        .find_panel(ids.panel_id)
        .await
        .ok_or_else(|| PricingError::unknown("panel", ids.panel_id))?;

    let inverter = catalog
        .find_inverter(ids.inverter_id)
        .await
        .ok_or_else(|| PricingError::unknown("inverter", ids.inverter_id))?;

    let mounting = catalog
        .find_mounting_system(ids.mounting_system_id)
        .await
        .ok_or_else(|| PricingError::unknown("mounting system", ids.mounting_system_id))?;

    let optimizer = match ids.optimizer_id {
        Some(id) => Some(
            catalog
                .find_optimizer(id)
                .await
                .ok_or_else(|| PricingError::unknown("optimizer", id))?,
        ),
        None => None,
    };

    let storage = match ids.storage_id {
        Some(id) => Some(
            catalog
                .find_energy_storage(id)
                .await
                .ok_or_else(|| PricingError::unknown("energy storage", id))?,
        ),
        None => None,
    };

    let mut errors = Vec::new();

    if let Some(optimizer) = &optimizer {
        if !optimizer.is_compatible_with(inverter.id) {
            errors.push(format!(
                "optimizer {} is not compatible with inverter {}",
                optimizer.model, inverter.model
            ));
        }
    }

    if let Some(storage) = &storage {
        if inverter.is_grid_only() {
            errors.push(format!(
                "inverter {} is a grid inverter and cannot take storage",
                inverter.model
            ));
        } else if !storage.is_compatible_with(inverter.id) {
            errors.push(format!(
                "storage {} is not compatible with inverter {}",
                storage.model, inverter.model
            ));
        }
    }

    if !errors.is_empty() {
        return Err(PricingError::InvalidSelection {
            message: "Selected components are not compatible".to_string(),
            errors,
        });
    }

    Ok(ResolvedSelection {
        panel,
        panel_count: ids.panel_count,
        inverter,
        optimizer,
        mounting,
        storage,
    })
}

/// Compatible options for an inverter, or the empty result when none is picked.
pub async fn compatibility_for(
    catalog: &Catalog,
    inverter_id: Option<Uuid>,
) -> Result<CompatibilityResult, PricingError> {
    let inverter = match inverter_id {
        Some(id) => Some(
            catalog
                .find_inverter(id)
                .await
                .ok_or_else(|| PricingError::unknown("inverter", id))?,
        ),
        None => None,
    };

    let optimizers = catalog.optimizers(None).await;
    let storages = catalog.energy_storages(None).await;

    Ok(filter_compatible(inverter.as_ref(), &optimizers, &storages))
}

/// Resolve the selection and compute its price breakdown.
pub async fn calculate_selection_price(
    catalog: &Catalog,
    ids: &SelectedComponents,
    margin: MarginInput,
) -> Result<PriceCalculation, PricingError> {
    let resolved = resolve_selection(catalog, ids).await?;
    let accessories = catalog.accessories().await;

    let calculation = calculate_with_margin(&resolved.as_selection(), &accessories, margin);
    debug!(
        "Priced {} x {} with {}: base {} final {}",
        resolved.panel_count,
        resolved.panel.model,
        resolved.inverter.model,
        calculation.base_price,
        calculation.final_price
    );

    Ok(calculation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CatalogCache;
    use crate::pricing::calculators::MarginPercent;
    use crate::pricing::static_catalog::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn catalog() -> Catalog {
        Catalog::new(Arc::new(StaticCatalog::sample()), CatalogCache::default())
    }

    fn hybrid_selection() -> SelectedComponents {
        SelectedComponents {
            panel_id: LONGI_430_ID,
            panel_count: 20,
            inverter_id: HUAWEI_10K_ID,
            optimizer_id: None,
            mounting_system_id: PITCHED_ROOF_ID,
            storage_id: Some(HUAWEI_LUNA_ID),
        }
    }

    #[test]
    fn test_pricing_error_display() {
        let err = PricingError::UnknownComponent {
            kind: "panel".to_string(),
            id: "abc".to_string(),
        };
        assert!(err.to_string().contains("panel"));
        assert!(err.to_string().contains("abc"));

        let err = PricingError::InvalidSelection {
            message: "test error".to_string(),
            errors: vec![],
        };
        assert!(err.to_string().contains("test error"));
    }

    #[tokio::test]
    async fn test_calculate_selection_price() {
        let calc = calculate_selection_price(
            &catalog(),
            &hybrid_selection(),
            MarginInput::Percent(MarginPercent::new(dec!(10))),
        )
        .await
        .unwrap();

        // 430 W * 20 = 8.6 kWp
        assert_eq!(calc.panels_price, dec!(11200));
        assert_eq!(calc.inverter_price, dec!(8900));
        assert_eq!(calc.mounting_price, dec!(3870));
        assert_eq!(calc.storage_price, dec!(21000));
        assert_eq!(calc.accessories_price, dec!(3500));
        assert_eq!(calc.base_price, dec!(48470));
        assert_eq!(calc.margin_amount, dec!(4847));
        assert_eq!(calc.final_price, dec!(53317));
        assert_eq!(calc.commission, dec!(3878));
    }

    #[tokio::test]
    async fn test_panel_minimum_is_enforced() {
        let mut ids = hybrid_selection();
        ids.panel_count = MIN_PANEL_COUNT - 1;

        let err = resolve_selection(&catalog(), &ids).await.unwrap_err();
        assert!(matches!(err, PricingError::InvalidSelection { .. }));
    }

    #[tokio::test]
    async fn test_unknown_component() {
        let mut ids = hybrid_selection();
        ids.panel_id = Uuid::new_v4();

        let err = resolve_selection(&catalog(), &ids).await.unwrap_err();
        match err {
            PricingError::UnknownComponent { kind, .. } => assert_eq!(kind, "panel"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_storage_rejected_on_grid_inverter() {
        let mut ids = hybrid_selection();
        ids.inverter_id = FRONIUS_SYMO_ID;

        let err = resolve_selection(&catalog(), &ids).await.unwrap_err();
        match err {
            PricingError::InvalidSelection { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("grid inverter"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_incompatible_optimizer_rejected() {
        let mut ids = hybrid_selection();
        ids.optimizer_id = Some(SOLAREDGE_P1100_ID);

        let err = resolve_selection(&catalog(), &ids).await.unwrap_err();
        assert!(matches!(err, PricingError::InvalidSelection { .. }));
    }

    #[tokio::test]
    async fn test_compatibility_for_solaredge_17k() {
        let result = compatibility_for(&catalog(), Some(SOLAREDGE_17K_ID)).await.unwrap();

        assert!(result.optimizers_required);
        assert!(result.show_high_power_optimizers);
        assert!(!result.storage_allowed);
        assert_eq!(result.optimizers.len(), 2);
        assert_eq!(result.default_optimizer.map(|o| o.id), Some(SOLAREDGE_P1100_ID));
    }

    #[tokio::test]
    async fn test_compatibility_without_inverter() {
        let result = compatibility_for(&catalog(), None).await.unwrap();
        assert_eq!(result, CompatibilityResult::default());
    }

    #[tokio::test]
    async fn test_compatibility_unknown_inverter() {
        let err = compatibility_for(&catalog(), Some(Uuid::new_v4())).await.unwrap_err();
        assert_eq!(err.error_type(), "unknown_component");
    }
}
