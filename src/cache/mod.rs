// src/cache/mod.rs

//! 24-hour result cache.
//!
//! File-per-key JSON store of raw per-(card, store) search results,
//! plus [`CachedStore`], a decorator that gives any [`Store`] transparent
//! caching under the identical `search` contract.
//!
//! An expired entry is indistinguishable from an absent one: lookups
//! delete stale files on access, and [`ResultCache::sweep`] clears them
//! in bulk at run start. Writes go to a temp file and are renamed into
//! place, so an interrupted fetch never leaves a partial entry and
//! same-key races resolve to the last writer.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{Card, Offer};
use crate::stores::Store;

/// Entry time-to-live.
const TTL_HOURS: i64 = 24;

fn ttl() -> Duration {
    Duration::hours(TTL_HOURS)
}

/// One cached search result. Constructed only inside this module.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    fetched_at: DateTime<Utc>,
    offers: Vec<Offer>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.fetched_at < ttl()
    }
}

/// File-backed cache of raw search results.
#[derive(Clone)]
pub struct ResultCache {
    dir: PathBuf,
}

impl ResultCache {
    /// Create a cache rooted at the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Deterministic key from the card identity and store name.
    /// Card quantity never participates.
    fn key(card: &Card, store_name: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(store_name.as_bytes());
        hasher.update(b"|");
        hasher.update(card.identity().as_bytes());
        hex::encode(hasher.finalize())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Look up a fresh entry for (card, store). Stale or unreadable
    /// entries are removed and treated as absent.
    pub async fn lookup(&self, card: &Card, store_name: &str) -> Option<Vec<Offer>> {
        let path = self.path_for(&Self::key(card, store_name));

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("Cache read failed for {}: {}", path.display(), e);
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Discarding unreadable cache entry {}: {}", path.display(), e);
                let _ = tokio::fs::remove_file(&path).await;
                return None;
            }
        };

        if !entry.is_fresh(Utc::now()) {
            log::debug!("Cache entry expired for {} @ {}", card.name, store_name);
            let _ = tokio::fs::remove_file(&path).await;
            return None;
        }

        Some(entry.offers)
    }

    /// Store a fresh result, replacing any prior entry for the key.
    pub async fn store(&self, card: &Card, store_name: &str, offers: &[Offer]) -> Result<()> {
        let entry = CacheEntry {
            fetched_at: Utc::now(),
            offers: offers.to_vec(),
        };
        self.write_entry(&Self::key(card, store_name), &entry).await
    }

    /// Write an entry atomically (temp file, then rename).
    async fn write_entry(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");

        let bytes = serde_json::to_vec(entry)?;
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Delete every expired entry. Returns the number removed.
    pub async fn sweep(&self) -> Result<usize> {
        let mut removed = 0;
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(AppError::Io(e)),
        };

        let now = Utc::now();
        while let Some(dir_entry) = entries.next_entry().await? {
            let path = dir_entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }

            let stale = match tokio::fs::read(&path).await {
                Ok(bytes) => serde_json::from_slice::<CacheEntry>(&bytes)
                    .map(|entry| !entry.is_fresh(now))
                    .unwrap_or(true),
                Err(_) => true,
            };

            if stale {
                let _ = tokio::fs::remove_file(&path).await;
                removed += 1;
            }
        }

        if removed > 0 {
            log::info!("Swept {removed} expired cache entries");
        }
        Ok(removed)
    }

    /// Delete every entry regardless of age. Returns the number removed.
    pub async fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(AppError::Io(e)),
        };

        while let Some(dir_entry) = entries.next_entry().await? {
            let path = dir_entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                tokio::fs::remove_file(&path).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Caching decorator around any store backend.
///
/// Same `search` contract as the wrapped backend; backend failures
/// propagate and are never cached.
pub struct CachedStore {
    inner: Arc<dyn Store>,
    cache: ResultCache,
}

impl CachedStore {
    pub fn new(inner: Arc<dyn Store>, cache: ResultCache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl Store for CachedStore {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn discount_eligible(&self) -> bool {
        self.inner.discount_eligible()
    }

    async fn search(&self, card: &Card) -> Result<Vec<Offer>> {
        if let Some(offers) = self.cache.lookup(card, self.inner.name()).await {
            log::debug!("Cache hit for {} @ {}", card.name, self.inner.name());
            return Ok(offers);
        }

        let offers = self.inner.search(card).await?;
        if let Err(e) = self.cache.store(card, self.inner.name(), &offers).await {
            log::warn!("Failed to cache result for {}: {}", card.name, e);
        }
        Ok(offers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Quality;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct CountingStore {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingStore {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl Store for CountingStore {
        fn name(&self) -> &'static str {
            "CountingStore"
        }

        async fn search(&self, card: &Card) -> Result<Vec<Offer>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::store_unavailable(self.name(), "down"));
            }
            Ok(vec![Offer {
                store: self.name().to_string(),
                card_name: card.name.clone(),
                set: "Test".to_string(),
                condition: Quality::NearMint,
                foil: false,
                price: 1.23,
                availability: 2,
                url: String::new(),
            }])
        }
    }

    #[tokio::test]
    async fn round_trip_within_ttl_skips_backend() {
        let tmp = TempDir::new().unwrap();
        let backend = Arc::new(CountingStore::new(false));
        let cached = CachedStore::new(backend.clone(), ResultCache::new(tmp.path()));
        let card = Card::parse("Brainstorm x4").unwrap();

        let first = cached.search(&card).await.unwrap();
        let second = cached.search(&card).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn key_ignores_quantity() {
        let a = Card::parse("Brainstorm x4").unwrap();
        let b = Card::parse("Brainstorm").unwrap();
        assert_eq!(
            ResultCache::key(&a, "StoreA"),
            ResultCache::key(&b, "StoreA")
        );
        assert_ne!(
            ResultCache::key(&a, "StoreA"),
            ResultCache::key(&a, "StoreB")
        );
    }

    #[tokio::test]
    async fn expired_entry_is_absent_and_refetched_once() {
        let tmp = TempDir::new().unwrap();
        let cache = ResultCache::new(tmp.path());
        let card = Card::parse("Brainstorm").unwrap();

        // Plant an entry fetched 25 hours ago.
        let stale = CacheEntry {
            fetched_at: Utc::now() - Duration::hours(25),
            offers: vec![],
        };
        cache
            .write_entry(&ResultCache::key(&card, "CountingStore"), &stale)
            .await
            .unwrap();

        let backend = Arc::new(CountingStore::new(false));
        let cached = CachedStore::new(backend.clone(), cache);
        let offers = cached.search(&card).await.unwrap();

        assert_eq!(offers.len(), 1);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn backend_failure_is_not_cached() {
        let tmp = TempDir::new().unwrap();
        let backend = Arc::new(CountingStore::new(true));
        let cached = CachedStore::new(backend.clone(), ResultCache::new(tmp.path()));
        let card = Card::parse("Brainstorm").unwrap();

        assert!(cached.search(&card).await.is_err());
        assert!(cached.search(&card).await.is_err());

        // Both calls reached the backend: nothing was cached.
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_entries() {
        let tmp = TempDir::new().unwrap();
        let cache = ResultCache::new(tmp.path());

        let fresh = CacheEntry {
            fetched_at: Utc::now(),
            offers: vec![],
        };
        let stale = CacheEntry {
            fetched_at: Utc::now() - Duration::hours(30),
            offers: vec![],
        };
        cache.write_entry("fresh", &fresh).await.unwrap();
        cache.write_entry("stale", &stale).await.unwrap();

        assert_eq!(cache.sweep().await.unwrap(), 1);
        assert!(tmp.path().join("fresh.json").exists());
        assert!(!tmp.path().join("stale.json").exists());
    }

    #[tokio::test]
    async fn sweep_on_missing_dir_is_a_noop() {
        let tmp = TempDir::new().unwrap();
        let cache = ResultCache::new(tmp.path().join("nope"));
        assert_eq!(cache.sweep().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let tmp = TempDir::new().unwrap();
        let cache = ResultCache::new(tmp.path());

        let fresh = CacheEntry {
            fetched_at: Utc::now(),
            offers: vec![],
        };
        cache.write_entry("a", &fresh).await.unwrap();
        cache.write_entry("b", &fresh).await.unwrap();

        assert_eq!(cache.clear().await.unwrap(), 2);
        assert_eq!(cache.clear().await.unwrap(), 0);
    }
}
