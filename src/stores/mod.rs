// src/stores/mod.rs

//! Store backends.
//!
//! Each backend implements the [`Store`] contract: given a card, return
//! zero or more offers, mapping transport failures to `StoreUnavailable`.
//! Zero matches is an empty list, never an error. The registry maps store
//! ids to constructors and is populated once at startup.

mod facetoface;
mod proxy;
mod topdeckhero;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{Card, HttpConfig, Offer, ProxyConfig};

pub use facetoface::FaceToFace;
pub use proxy::Proxy;
pub use topdeckhero::TopDeckHero;

/// Every backend fetches at most this many result pages per card query.
pub const MAX_PAGES: usize = 2;

/// Common contract for store backends.
#[async_trait]
pub trait Store: Send + Sync {
    /// Canonical store name, set on every produced offer.
    fn name(&self) -> &'static str;

    /// Whether the store's listed prices carry a known checkout discount.
    fn discount_eligible(&self) -> bool {
        false
    }

    /// Search the store for a card.
    ///
    /// Fails with `StoreUnavailable` on transport failure; "not found"
    /// is an empty list.
    async fn search(&self, card: &Card) -> Result<Vec<Offer>>;
}

/// Registered store ids, in registry order.
const STORE_IDS: [&str; 3] = [FaceToFace::ID, TopDeckHero::ID, Proxy::ID];

/// Ids of all registered stores.
pub fn all_store_ids() -> Vec<String> {
    STORE_IDS.iter().map(|s| s.to_string()).collect()
}

/// Resolve user-supplied store names to canonical ids.
///
/// Accepts ids case-insensitively, deduplicates while preserving order,
/// and fails on any unknown name.
pub fn canonical_ids(names: &[String]) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    for name in names {
        let wanted = name.trim().to_lowercase();
        let id = STORE_IDS
            .iter()
            .find(|&&id| id == wanted)
            .ok_or_else(|| {
                AppError::config(format!(
                    "Unknown store: {}. Available stores: {}",
                    name,
                    STORE_IDS.join(", ")
                ))
            })?;
        if !ids.contains(&id.to_string()) {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}

/// Build backend instances for the given store ids.
pub fn build(
    ids: &[String],
    client: &reqwest::Client,
    http: &HttpConfig,
    proxy: &ProxyConfig,
) -> Result<Vec<Arc<dyn Store>>> {
    ids.iter()
        .map(|id| -> Result<Arc<dyn Store>> {
            match id.as_str() {
                FaceToFace::ID => Ok(Arc::new(FaceToFace::new(client.clone(), http))),
                TopDeckHero::ID => Ok(Arc::new(TopDeckHero::new(client.clone(), http))),
                Proxy::ID => Ok(Arc::new(Proxy::new(proxy.allow_foil))),
                other => Err(AppError::config(format!("Unknown store: {other}"))),
            }
        })
        .collect()
}
