//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Quality;
use crate::stores;
use crate::strategy::Strategy;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Result cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Search and selection settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Proxy store settings
    #[serde(default)]
    pub proxy: ProxyConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::config("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::config("http.timeout_secs must be > 0"));
        }
        if self.http.max_concurrent_per_store == 0 {
            return Err(AppError::config("http.max_concurrent_per_store must be > 0"));
        }
        Ok(())
    }

    /// Resolve search options into typed run options.
    ///
    /// Unknown store or strategy names and bad quality labels fail here,
    /// before any network activity begins.
    pub fn resolve(&self) -> Result<RunOptions> {
        self.validate()?;

        let enabled_stores = match &self.search.stores {
            Some(names) => stores::canonical_ids(names)?,
            None => stores::all_store_ids(),
        };

        let strategy = Strategy::parse(&self.search.strategy)?;

        let min_quality = self
            .search
            .min_quality
            .as_deref()
            .map(Quality::parse)
            .transpose()?;

        Ok(RunOptions {
            enabled_stores,
            strategy,
            min_quality,
            apply_discount: self.search.apply_discount,
            use_cache: self.search.use_cache,
        })
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Politeness delay between successive page fetches to one store,
    /// in milliseconds
    #[serde(default = "defaults::page_delay")]
    pub page_delay_ms: u64,

    /// Maximum concurrent searches against one store
    #[serde(default = "defaults::max_concurrent_per_store")]
    pub max_concurrent_per_store: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            page_delay_ms: defaults::page_delay(),
            max_concurrent_per_store: defaults::max_concurrent_per_store(),
        }
    }
}

/// Result cache settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheConfig {
    /// Cache directory. Defaults to the platform cache dir.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl CacheConfig {
    /// Resolve the cache directory, falling back to the platform default.
    pub fn resolve_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("mtg-deal-finder")
        })
    }
}

/// Search and selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Store ids to search. None means all registered stores.
    #[serde(default)]
    pub stores: Option<Vec<String>>,

    /// Selection strategy name
    #[serde(default = "defaults::strategy")]
    pub strategy: String,

    /// Minimum acceptable condition (label or alias)
    #[serde(default)]
    pub min_quality: Option<String>,

    /// Apply the checkout discount for discount-eligible stores
    #[serde(default)]
    pub apply_discount: bool,

    /// Read and write the 24h result cache
    #[serde(default = "defaults::use_cache")]
    pub use_cache: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            stores: None,
            strategy: defaults::strategy(),
            min_quality: None,
            apply_discount: false,
            use_cache: defaults::use_cache(),
        }
    }
}

/// Proxy store settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProxyConfig {
    /// Also generate foil proxy offers
    #[serde(default)]
    pub allow_foil: bool,
}

/// Validated, typed options for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Canonical ids of the stores to search
    pub enabled_stores: Vec<String>,

    /// Selection strategy applied uniformly to every card
    pub strategy: Strategy,

    /// Offers below this condition are dropped before selection
    pub min_quality: Option<Quality>,

    /// Whether the checkout discount rule is applied
    pub apply_discount: bool,

    /// Whether the result cache is consulted at all
    pub use_cache: bool,
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; mtg-deal-finder/0.1)".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn page_delay() -> u64 {
        500
    }
    pub fn max_concurrent_per_store() -> usize {
        2
    }
    pub fn strategy() -> String {
        "cheapest".into()
    }
    pub fn use_cache() -> bool {
        true
    }
}
