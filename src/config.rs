//! Runtime configuration from environment variables (and `.env` via dotenvy).

use std::str::FromStr;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_CURRENCY: &str = "PLN";
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value '{value}' for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Where catalog rows are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSourceKind {
    Postgres,
    /// Built-in sample catalog
    Static,
}

impl FromStr for CatalogSourceKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(CatalogSourceKind::Postgres),
            "static" => Ok(CatalogSourceKind::Static),
            _ => Err(()),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub database_max_connections: u32,
    /// ISO code attached to every money value in responses
    pub currency: String,
    pub catalog_source: CatalogSourceKind,
    pub catalog_cache_ttl: Duration,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            currency: lookup("CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            catalog_source: parse_or(&lookup, "CATALOG_SOURCE", CatalogSourceKind::Postgres)?,
            catalog_cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                "CATALOG_CACHE_TTL_SECS",
                DEFAULT_CATALOG_CACHE_TTL_SECS,
            )?),
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(parsed),
            Err(_) => Err(ConfigError::Invalid { key, value }),
        },
        None => Ok(default),
    }
}
