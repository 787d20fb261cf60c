//! Per-language cache of the served FAQ list.
//!
//! Each language owns a slot behind an async mutex. Whoever holds the
//! mutex is populating the slot; concurrent readers of the same language
//! queue on it and then find the fresh entry, so a stampede of misses costs
//! a single store scan.
//!
//! Expiry is checked at read time. [`FaqCache::invalidate`] bumps an epoch
//! counter; an entry from an older epoch is never served, even if a
//! population that started before the invalidation finishes after it.

use crate::i18n::LanguageCode;
use crate::metrics::ServiceMetrics;
use crate::model::FaqView;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Cached projection for one language.
#[derive(Debug, Clone)]
struct CacheEntry {
    views: Arc<Vec<FaqView>>,
    created_at: Instant,
    expires_at: Instant,
    epoch: u64,
}

type Slot = Arc<tokio::sync::Mutex<Option<CacheEntry>>>;

/// Response cache keyed by language.
pub struct FaqCache {
    ttl: Duration,
    epoch: AtomicU64,
    populations: AtomicUsize,
    slots: Mutex<HashMap<LanguageCode, Slot>>,
    metrics: Arc<ServiceMetrics>,
}

/// Cache state reported by `/health`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub ttl_secs: u64,
    pub epoch: u64,
    /// Languages with a live entry, sorted
    pub cached_languages: Vec<String>,
    /// Slots currently being populated
    pub populating: usize,
    pub hits: usize,
    pub misses: usize,
    /// Successful populations since start
    pub populations: usize,
}

impl FaqCache {
    pub fn new(ttl: Duration, metrics: Arc<ServiceMetrics>) -> Self {
        Self {
            ttl,
            epoch: AtomicU64::new(0),
            populations: AtomicUsize::new(0),
            slots: Mutex::new(HashMap::new()),
            metrics,
        }
    }

    fn slot(&self, lang: &LanguageCode) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.entry(lang.clone()).or_default().clone()
    }

    /// Return the cached list for `lang`, or run `loader` to build it.
    ///
    /// `loader` runs at most once per call and only while this call holds
    /// the language's slot. Its error is returned as-is and nothing is
    /// cached, so a failed scan is never mistaken for an empty list. An
    /// empty list is cached like any other value.
    pub async fn get_or_populate<F, Fut, E>(
        &self,
        lang: &LanguageCode,
        loader: F,
    ) -> Result<Arc<Vec<FaqView>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<FaqView>, E>>,
    {
        let slot = self.slot(lang);
        let mut entry = slot.lock().await;

        let epoch = self.epoch.load(Ordering::SeqCst);
        if let Some(cached) = entry.as_ref() {
            if cached.epoch == epoch && Instant::now() < cached.expires_at {
                self.metrics.record_cache_hit();
                debug!(
                    "Cache hit for '{}' (age {:?})",
                    lang,
                    cached.created_at.elapsed()
                );
                return Ok(cached.views.clone());
            }
        }

        self.metrics.record_cache_miss();
        *entry = None;

        let views = Arc::new(loader().await?);
        self.populations.fetch_add(1, Ordering::Relaxed);
        let now = Instant::now();
        *entry = Some(CacheEntry {
            views: views.clone(),
            created_at: now,
            expires_at: now + self.ttl,
            epoch,
        });

        debug!(
            "Cached {} FAQ(s) for '{}' (epoch {}, ttl {:?})",
            views.len(),
            lang,
            epoch,
            self.ttl
        );
        Ok(views)
    }

    /// Drop every language's entry immediately, regardless of expiry.
    ///
    /// Slots are kept so readers keep queuing on the same per-language
    /// mutex; an entry stored under an older epoch reads as a miss. Idle
    /// slots are emptied now, busy ones on their next population.
    pub fn invalidate(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let mut busy = 0;
        for slot in slots.values() {
            match slot.try_lock() {
                Ok(mut entry) => *entry = None,
                Err(_) => busy += 1,
            }
        }
        debug!(
            "Cache invalidated (epoch {}, {} slot(s), {} populating)",
            epoch,
            slots.len(),
            busy
        );
    }

    pub fn stats(&self) -> CacheStats {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let now = Instant::now();
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());

        let mut cached_languages = Vec::new();
        let mut populating = 0;
        for (lang, slot) in slots.iter() {
            match slot.try_lock() {
                Ok(entry) => {
                    if entry
                        .as_ref()
                        .is_some_and(|e| e.epoch == epoch && now < e.expires_at)
                    {
                        cached_languages.push(lang.to_string());
                    }
                }
                Err(_) => populating += 1,
            }
        }
        cached_languages.sort();

        CacheStats {
            ttl_secs: self.ttl.as_secs(),
            epoch,
            cached_languages,
            populating,
            hits: self.metrics.cache_hits(),
            misses: self.metrics.cache_misses(),
            populations: self.populations.load(Ordering::Relaxed),
        }
    }
}
