//! In-memory caching using moka
//!
//! Provides application-level caching for catalog listings. Catalog rows only
//! change through the admin screens, so listings are kept for the configured
//! TTL and refreshed periodically by the warmer.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::info;

use crate::pricing::catalog::Catalog;
use crate::pricing::models::{
    AccessoriesConfig, EnergyStorage, Inverter, MountingSystem, Optimizer, Panel,
};

/// Catalog cache holding one listing per (kind, filter) key
#[derive(Clone)]
pub struct CatalogCache {
    pub panels: Cache<String, Arc<Vec<Panel>>>,
    /// Inverters (type filter -> rows)
    pub inverters: Cache<String, Arc<Vec<Inverter>>>,
    /// Optimizers (inverter id -> rows)
    pub optimizers: Cache<String, Arc<Vec<Optimizer>>>,
    pub mounting_systems: Cache<String, Arc<Vec<MountingSystem>>>,
    /// Energy storages (inverter id -> rows)
    pub energy_storages: Cache<String, Arc<Vec<EnergyStorage>>>,
    /// Accessories config (singleton)
    pub accessories: Cache<String, Arc<AccessoriesConfig>>,
}

impl CatalogCache {
    /// Create a new cache instance with the given TTL for every listing
    pub fn new(ttl: Duration) -> Self {
        Self {
            panels: Self::listing_cache(ttl),
            inverters: Self::listing_cache(ttl),
            optimizers: Self::listing_cache(ttl),
            mounting_systems: Self::listing_cache(ttl),
            energy_storages: Self::listing_cache(ttl),
            accessories: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    fn listing_cache<V>(ttl: Duration) -> Cache<String, Arc<V>>
    where
        V: Send + Sync + 'static,
    {
        // One unfiltered listing plus a handful of per-inverter/per-type filters
        Cache::builder().max_capacity(100).time_to_live(ttl).build()
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            panels_size: self.panels.entry_count(),
            inverters_size: self.inverters.entry_count(),
            optimizers_size: self.optimizers.entry_count(),
            mounting_systems_size: self.mounting_systems.entry_count(),
            energy_storages_size: self.energy_storages.entry_count(),
            accessories_cached: self.accessories.entry_count() > 0,
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.panels.invalidate_all();
        self.inverters.invalidate_all();
        self.optimizers.invalidate_all();
        self.mounting_systems.invalidate_all();
        self.energy_storages.invalidate_all();
        self.accessories.invalidate_all();
        info!("All catalog caches invalidated");
    }

    /// Generate cache key for a listing
    pub fn listing_key(kind: &str, filter: Option<&str>) -> String {
        match filter {
            Some(f) => format!("{}:{}", kind, f),
            None => format!("{}:all", kind),
        }
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(10 * 60))
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub panels_size: u64,
    pub inverters_size: u64,
    pub optimizers_size: u64,
    pub mounting_systems_size: u64,
    pub energy_storages_size: u64,
    pub accessories_cached: bool,
}

/// Start background cache warmer
///
/// Warms the catalog on startup and refreshes it every `period`.
pub async fn start_cache_warmer(catalog: Catalog, period: Duration) {
    let mut interval = interval(period);
    loop {
        // first tick completes immediately
        interval.tick().await;
        info!("Starting catalog cache warm-up...");
        catalog.warm().await;
        info!("Catalog warm-up complete. Stats: {:?}", catalog.cache().stats());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_key() {
        assert_eq!(CatalogCache::listing_key("panels", None), "panels:all");
        assert_eq!(CatalogCache::listing_key("inverters", Some("hybrid")), "inverters:hybrid");
    }

    #[tokio::test]
    async fn test_invalidate_all_clears_entries() {
        let cache = CatalogCache::default();
        cache
            .panels
            .insert(CatalogCache::listing_key("panels", None), Arc::new(vec![]))
            .await;
        cache
            .accessories
            .insert("accessories".to_string(), Arc::new(AccessoriesConfig::default()))
            .await;

        assert!(cache.panels.get("panels:all").await.is_some());

        cache.invalidate_all();

        assert!(cache.panels.get("panels:all").await.is_none());
        assert!(cache.accessories.get("accessories").await.is_none());
    }
}
