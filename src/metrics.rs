//! Service metrics and observability module.
//!
//! Counters for the read-path cache, store scans and translator calls.
//! One instance is created per service and shared through `Arc`; tests use
//! the counters as instrumentation hooks (e.g. "exactly one store scan").

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Per-service counters.
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    /// Reads answered from a live cache entry
    cache_hits: AtomicUsize,

    /// Reads that had to populate the cache
    cache_misses: AtomicUsize,

    /// Full scans of the record store
    store_scans: AtomicUsize,

    /// Calls made to the translation backend (each retry attempt counts)
    translation_calls: AtomicUsize,

    /// Gateway calls that ended in a `TranslationError`
    translation_failures: AtomicUsize,
}

impl ServiceMetrics {
    /// Create a zeroed metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cache hit.
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss.
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a full store scan.
    pub fn record_store_scan(&self) {
        self.store_scans.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a call to the translation backend.
    pub fn record_translation_call(&self) {
        self.translation_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed gateway translation.
    pub fn record_translation_failure(&self) {
        self.translation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn store_scans(&self) -> usize {
        self.store_scans.load(Ordering::Relaxed)
    }

    pub fn translation_calls(&self) -> usize {
        self.translation_calls.load(Ordering::Relaxed)
    }

    pub fn translation_failures(&self) -> usize {
        self.translation_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_reads = hits + misses;
        let cache_hit_rate = if total_reads > 0 {
            (hits as f64 / total_reads as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            store_scans: self.store_scans(),
            translation_calls: self.translation_calls(),
            translation_failures: self.translation_failures(),
        }
    }
}

/// Snapshot of the service counters, served by `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub store_scans: usize,
    pub translation_calls: usize,
    pub translation_failures: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Counter Tests ====================

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = ServiceMetrics::new();
        assert_eq!(metrics.cache_hits(), 0);
        assert_eq!(metrics.cache_misses(), 0);
        assert_eq!(metrics.store_scans(), 0);
        assert_eq!(metrics.translation_calls(), 0);
        assert_eq!(metrics.translation_failures(), 0);
    }

    #[test]
    fn test_record_each_counter() {
        let metrics = ServiceMetrics::new();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();
        metrics.record_store_scan();
        metrics.record_translation_call();
        metrics.record_translation_failure();

        assert_eq!(metrics.cache_hits(), 2);
        assert_eq!(metrics.cache_misses(), 1);
        assert_eq!(metrics.store_scans(), 1);
        assert_eq!(metrics.translation_calls(), 1);
        assert_eq!(metrics.translation_failures(), 1);
    }

    #[test]
    fn test_instances_are_independent() {
        let a = ServiceMetrics::new();
        let b = ServiceMetrics::new();
        a.record_store_scan();
        assert_eq!(a.store_scans(), 1);
        assert_eq!(b.store_scans(), 0);
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_report_empty() {
        let report = ServiceMetrics::new().report();
        assert_eq!(report.cache_hit_rate, 0.0);
        assert_eq!(report.store_scans, 0);
    }

    #[test]
    fn test_report_cache_hit_rate() {
        let metrics = ServiceMetrics::new();

        // 3 hits, 1 miss = 75% hit rate
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();

        let report = metrics.report();
        assert_eq!(report.cache_hits, 3);
        assert_eq!(report.cache_misses, 1);
        assert_eq!(report.cache_hit_rate, 75.0);
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_value(ServiceMetrics::new().report()).unwrap();
        assert_eq!(json["store_scans"], 0);
        assert!(json.get("cache_hit_rate").is_some());
    }
}
