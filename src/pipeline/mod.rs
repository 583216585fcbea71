// src/pipeline/mod.rs

//! Search pipeline orchestration.
//!
//! Wires the stages together: build backends (wrapped in the result
//! cache unless disabled), fan the want-list out, normalize, select,
//! and assemble per-card reports.

pub mod assemble;
pub mod search;

use std::sync::Arc;

pub use assemble::{CardReport, assemble};
pub use search::{CardOffers, StoreFailure};

use crate::cache::{CachedStore, ResultCache};
use crate::error::Result;
use crate::models::{Card, Config, RunOptions};
use crate::stores::{self, Store};
use crate::utils::http;

/// Run the full search pipeline for a want-list.
pub async fn run(config: &Config, options: &RunOptions, cards: &[Card]) -> Result<Vec<CardReport>> {
    let client = http::create_client(&config.http)?;
    let mut backends = stores::build(
        &options.enabled_stores,
        &client,
        &config.http,
        &config.proxy,
    )?;

    if options.use_cache {
        let cache = ResultCache::new(config.cache.resolve_dir());
        cache.sweep().await?;
        backends = backends
            .into_iter()
            .map(|backend| Arc::new(CachedStore::new(backend, cache.clone())) as Arc<dyn Store>)
            .collect();
    } else {
        log::info!("Result cache disabled; every search hits the stores");
    }

    let discount_stores = search::discount_stores(&backends);
    let results = search::gather(&backends, cards, config.http.max_concurrent_per_store).await;

    for (store, count) in search::failure_counts(&results) {
        log::warn!("Store {store} failed for {count} card(s)");
    }

    let reports = results
        .into_iter()
        .map(|result| {
            let offers = search::normalize(result.offers, &discount_stores, options);
            assemble(result.card, offers, options.strategy, result.failures)
        })
        .collect();

    Ok(reports)
}
