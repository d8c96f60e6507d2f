use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use solarquote_web::cache::{start_cache_warmer, CatalogCache};
use solarquote_web::config::{CatalogSourceKind, Config};
use solarquote_web::pricing::{Catalog, CatalogSource, PgCatalog, StaticCatalog};
use solarquote_web::quotes::PgQuoteStore;
use solarquote_web::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("solarquote_web=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("loading configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("connecting to database")?;

    let source: Arc<dyn CatalogSource> = match config.catalog_source {
        CatalogSourceKind::Postgres => Arc::new(PgCatalog::new(pool.clone())),
        CatalogSourceKind::Static => Arc::new(StaticCatalog::sample()),
    };
    info!("Catalog source: {:?}", config.catalog_source);

    let ttl = config.catalog_cache_ttl;
    let catalog = Catalog::new(source, CatalogCache::new(ttl));
    // interval() panics on a zero period
    let warm_period = (ttl / 2).max(Duration::from_secs(1));
    tokio::spawn(start_cache_warmer(catalog.clone(), warm_period));

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        catalog,
        quotes: Arc::new(PgQuoteStore::new(pool)),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;
    info!("Listening on {}", bind_addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
