//! Catalog access for the pricing engine.
//!
//! `CatalogSource` is the seam to whatever holds the catalog (PostgreSQL in
//! production, [`StaticCatalog`](super::static_catalog::StaticCatalog) for the
//! sample catalog and tests). `Catalog` wraps a source with the moka cache and
//! degrades every failed read to an empty result.

use async_trait::async_trait;
use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::CatalogCache;
use crate::error::AppError;

use super::models::{
    AccessoriesConfig, EnergyStorage, Inverter, MountingSystem, Optimizer, Panel,
};

const ACCESSORIES_KEY: &str = "accessories";

/// Read-only access to the component catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_panels(&self) -> Result<Vec<Panel>, AppError>;

    /// List inverters, optionally only those carrying a type tag
    async fn list_inverters(&self, type_filter: Option<&str>) -> Result<Vec<Inverter>, AppError>;

    /// List optimizers, optionally only those compatible with an inverter
    async fn list_optimizers(&self, inverter_id: Option<Uuid>) -> Result<Vec<Optimizer>, AppError>;

    async fn list_mounting_systems(&self) -> Result<Vec<MountingSystem>, AppError>;

    /// List energy storages, optionally only those compatible with an inverter
    async fn list_energy_storages(
        &self,
        inverter_id: Option<Uuid>,
    ) -> Result<Vec<EnergyStorage>, AppError>;

    async fn get_accessories_config(&self) -> Result<AccessoriesConfig, AppError>;
}

/// Cached catalog facade shared by the handlers
#[derive(Clone)]
pub struct Catalog {
    source: Arc<dyn CatalogSource>,
    cache: CatalogCache,
}

impl Catalog {
    pub fn new(source: Arc<dyn CatalogSource>, cache: CatalogCache) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    pub async fn panels(&self) -> Vec<Panel> {
        let key = CatalogCache::listing_key("panels", None);
        load_cached(&self.cache.panels, key, "panels", || self.source.list_panels())
            .await
            .map(|rows| (*rows).clone())
            .unwrap_or_default()
    }

    pub async fn inverters(&self, type_filter: Option<&str>) -> Vec<Inverter> {
        let key = CatalogCache::listing_key("inverters", type_filter);
        load_cached(&self.cache.inverters, key, "inverters", || {
            self.source.list_inverters(type_filter)
        })
        .await
        .map(|rows| (*rows).clone())
        .unwrap_or_default()
    }

    pub async fn optimizers(&self, inverter_id: Option<Uuid>) -> Vec<Optimizer> {
        let filter = inverter_id.map(|id| id.to_string());
        let key = CatalogCache::listing_key("optimizers", filter.as_deref());
        load_cached(&self.cache.optimizers, key, "optimizers", || {
            self.source.list_optimizers(inverter_id)
        })
        .await
        .map(|rows| (*rows).clone())
        .unwrap_or_default()
    }

    pub async fn mounting_systems(&self) -> Vec<MountingSystem> {
        let key = CatalogCache::listing_key("mounting_systems", None);
        load_cached(&self.cache.mounting_systems, key, "mounting systems", || {
            self.source.list_mounting_systems()
        })
        .await
        .map(|rows| (*rows).clone())
        .unwrap_or_default()
    }

    pub async fn energy_storages(&self, inverter_id: Option<Uuid>) -> Vec<EnergyStorage> {
        let filter = inverter_id.map(|id| id.to_string());
        let key = CatalogCache::listing_key("energy_storages", filter.as_deref());
        load_cached(&self.cache.energy_storages, key, "energy storages", || {
            self.source.list_energy_storages(inverter_id)
        })
        .await
        .map(|rows| (*rows).clone())
        .unwrap_or_default()
    }

    pub async fn accessories(&self) -> AccessoriesConfig {
        load_cached(
            &self.cache.accessories,
            ACCESSORIES_KEY.to_string(),
            "accessories config",
            || self.source.get_accessories_config(),
        )
        .await
        .map(|config| (*config).clone())
        .unwrap_or_default()
    }

    pub async fn find_panel(&self, id: Uuid) -> Option<Panel> {
        self.panels().await.into_iter().find(|p| p.id == id)
    }

    pub async fn find_inverter(&self, id: Uuid) -> Option<Inverter> {
        self.inverters(None).await.into_iter().find(|i| i.id == id)
    }

    pub async fn find_optimizer(&self, id: Uuid) -> Option<Optimizer> {
        self.optimizers(None).await.into_iter().find(|o| o.id == id)
    }

    pub async fn find_mounting_system(&self, id: Uuid) -> Option<MountingSystem> {
        self.mounting_systems().await.into_iter().find(|m| m.id == id)
    }

    pub async fn find_energy_storage(&self, id: Uuid) -> Option<EnergyStorage> {
        self.energy_storages(None).await.into_iter().find(|s| s.id == id)
    }

    /// Reload the unfiltered listings from the source.
    ///
    /// A failed reload keeps the previous entry until its TTL runs out.
    pub async fn warm(&self) {
        let cache = &self.cache;
        fetch_into(&cache.panels, CatalogCache::listing_key("panels", None), "panels", || {
            self.source.list_panels()
        })
        .await;
        fetch_into(&cache.inverters, CatalogCache::listing_key("inverters", None), "inverters", || {
            self.source.list_inverters(None)
        })
        .await;
        fetch_into(&cache.optimizers, CatalogCache::listing_key("optimizers", None), "optimizers", || {
            self.source.list_optimizers(None)
        })
        .await;
        fetch_into(
            &cache.mounting_systems,
            CatalogCache::listing_key("mounting_systems", None),
            "mounting systems",
            || self.source.list_mounting_systems(),
        )
        .await;
        fetch_into(
            &cache.energy_storages,
            CatalogCache::listing_key("energy_storages", None),
            "energy storages",
            || self.source.list_energy_storages(None),
        )
        .await;
        fetch_into(&cache.accessories, ACCESSORIES_KEY.to_string(), "accessories config", || {
            self.source.get_accessories_config()
        })
        .await;
    }
}

/// Return the cached value or fetch it from the source
async fn load_cached<V, F, Fut>(
    cache: &Cache<String, Arc<V>>,
    key: String,
    what: &str,
    fetch: F,
) -> Option<Arc<V>>
where
    V: Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, AppError>>,
{
    if let Some(hit) = cache.get(&key).await {
        debug!("Cache HIT for {}: {}", what, key);
        return Some(hit);
    }
    debug!("Cache MISS for {}: {}", what, key);
    fetch_into(cache, key, what, fetch).await
}

/// Fetch from the source and cache on success. Failures are logged, not cached.
async fn fetch_into<V, F, Fut>(
    cache: &Cache<String, Arc<V>>,
    key: String,
    what: &str,
    fetch: F,
) -> Option<Arc<V>>
where
    V: Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, AppError>>,
{
    match fetch().await {
        Ok(value) => {
            let value = Arc::new(value);
            cache.insert(key, value.clone()).await;
            Some(value)
        }
        Err(e) => {
            warn!("Failed to load {}: {}", what, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::static_catalog::{self, StaticCatalog};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source whose every read fails
    struct BrokenCatalog;

    #[async_trait]
    impl CatalogSource for BrokenCatalog {
        async fn list_panels(&self) -> Result<Vec<Panel>, AppError> {
            Err(AppError::Internal("connection refused".to_string()))
        }
        async fn list_inverters(&self, _: Option<&str>) -> Result<Vec<Inverter>, AppError> {
            Err(AppError::Internal("connection refused".to_string()))
        }
        async fn list_optimizers(&self, _: Option<Uuid>) -> Result<Vec<Optimizer>, AppError> {
            Err(AppError::Internal("connection refused".to_string()))
        }
        async fn list_mounting_systems(&self) -> Result<Vec<MountingSystem>, AppError> {
            Err(AppError::Internal("connection refused".to_string()))
        }
        async fn list_energy_storages(&self, _: Option<Uuid>) -> Result<Vec<EnergyStorage>, AppError> {
            Err(AppError::Internal("connection refused".to_string()))
        }
        async fn get_accessories_config(&self) -> Result<AccessoriesConfig, AppError> {
            Err(AppError::Internal("connection refused".to_string()))
        }
    }

    /// Counts panel reads so cache hits are observable
    struct CountingCatalog {
        inner: StaticCatalog,
        panel_reads: AtomicUsize,
    }

    #[async_trait]
    impl CatalogSource for CountingCatalog {
        async fn list_panels(&self) -> Result<Vec<Panel>, AppError> {
            self.panel_reads.fetch_add(1, Ordering::SeqCst);
            self.inner.list_panels().await
        }
        async fn list_inverters(&self, f: Option<&str>) -> Result<Vec<Inverter>, AppError> {
            self.inner.list_inverters(f).await
        }
        async fn list_optimizers(&self, id: Option<Uuid>) -> Result<Vec<Optimizer>, AppError> {
            self.inner.list_optimizers(id).await
        }
        async fn list_mounting_systems(&self) -> Result<Vec<MountingSystem>, AppError> {
            self.inner.list_mounting_systems().await
        }
        async fn list_energy_storages(&self, id: Option<Uuid>) -> Result<Vec<EnergyStorage>, AppError> {
            self.inner.list_energy_storages(id).await
        }
        async fn get_accessories_config(&self) -> Result<AccessoriesConfig, AppError> {
            self.inner.get_accessories_config().await
        }
    }

    #[tokio::test]
    async fn test_failed_reads_degrade_to_empty() {
        let catalog = Catalog::new(Arc::new(BrokenCatalog), CatalogCache::default());

        assert!(catalog.panels().await.is_empty());
        assert!(catalog.inverters(Some("hybrid")).await.is_empty());
        assert!(catalog.optimizers(None).await.is_empty());
        assert!(catalog.mounting_systems().await.is_empty());
        assert!(catalog.energy_storages(Some(Uuid::new_v4())).await.is_empty());
        assert!(catalog.accessories().await.bands.is_empty());
        assert!(catalog.find_panel(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_listings_are_cached() {
        let source = Arc::new(CountingCatalog {
            inner: StaticCatalog::sample(),
            panel_reads: AtomicUsize::new(0),
        });
        let catalog = Catalog::new(source.clone(), CatalogCache::default());

        let first = catalog.panels().await;
        let second = catalog.panels().await;

        assert!(!first.is_empty());
        assert_eq!(first, second);
        assert_eq!(source.panel_reads.load(Ordering::SeqCst), 1);

        catalog.cache().invalidate_all();
        catalog.panels().await;
        assert_eq!(source.panel_reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_warm_reloads_from_source() {
        let source = Arc::new(CountingCatalog {
            inner: StaticCatalog::sample(),
            panel_reads: AtomicUsize::new(0),
        });
        let catalog = Catalog::new(source.clone(), CatalogCache::default());

        catalog.warm().await;
        catalog.panels().await;

        assert_eq!(source.panel_reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_filtered_listings() {
        let catalog = Catalog::new(Arc::new(StaticCatalog::sample()), CatalogCache::default());

        let hybrids = catalog.inverters(Some("hybrid")).await;
        assert!(!hybrids.is_empty());
        assert!(hybrids.iter().all(|i| i.has_type("hybrid")));

        let optimizers = catalog.optimizers(Some(static_catalog::SOLAREDGE_17K_ID)).await;
        assert!(!optimizers.is_empty());
        assert!(optimizers
            .iter()
            .all(|o| o.is_compatible_with(static_catalog::SOLAREDGE_17K_ID)));

        let found = catalog.find_inverter(static_catalog::SOLAREDGE_17K_ID).await;
        assert_eq!(found.map(|i| i.model), Some("SE17K".to_string()));
    }
}
