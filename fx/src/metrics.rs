//! Counters for how rate requests were answered.

use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::fallback::FallbackKind;

/// Resolver metrics.
pub struct ResolverMetrics {
    /// Total rate requests.
    pub requests_total: AtomicU64,
    /// Answered from cache.
    pub cache_hits: AtomicU64,
    /// Answered from the fallback table directly.
    pub fallback_direct: AtomicU64,
    /// Answered from the fallback table through USD.
    pub fallback_via_usd: AtomicU64,
    /// Answered with the identity rate.
    pub fallback_identity: AtomicU64,
    /// Remote successes, by source name.
    source_hits: DashMap<String, AtomicU64>,
    /// Remote failures, by source name.
    source_failures: DashMap<String, AtomicU64>,
}

impl ResolverMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            fallback_direct: AtomicU64::new(0),
            fallback_via_usd: AtomicU64::new(0),
            fallback_identity: AtomicU64::new(0),
            source_hits: DashMap::new(),
            source_failures: DashMap::new(),
        }
    }

    pub fn request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn source_hit(&self, source: &str) {
        Self::bump(&self.source_hits, source);
    }

    pub fn source_failure(&self, source: &str) {
        Self::bump(&self.source_failures, source);
    }

    pub fn fallback(&self, kind: FallbackKind) {
        let counter = match kind {
            FallbackKind::Direct => &self.fallback_direct,
            FallbackKind::ViaUsd => &self.fallback_via_usd,
            FallbackKind::Identity => &self.fallback_identity,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            source_hits: Self::collect(&self.source_hits),
            source_failures: Self::collect(&self.source_failures),
            fallback_direct: self.fallback_direct.load(Ordering::Relaxed),
            fallback_via_usd: self.fallback_via_usd.load(Ordering::Relaxed),
            fallback_identity: self.fallback_identity.load(Ordering::Relaxed),
        }
    }

    fn bump(map: &DashMap<String, AtomicU64>, source: &str) {
        if let Some(counter) = map.get(source) {
            counter.fetch_add(1, Ordering::Relaxed);
            return;
        }
        map.entry(source.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    fn collect(map: &DashMap<String, AtomicU64>) -> BTreeMap<String, u64> {
        map.iter()
            .map(|e| (e.key().clone(), e.value().load(Ordering::Relaxed)))
            .collect()
    }
}

impl Default for ResolverMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time snapshot of metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub cache_hits: u64,
    pub source_hits: BTreeMap<String, u64>,
    pub source_failures: BTreeMap<String, u64>,
    pub fallback_direct: u64,
    pub fallback_via_usd: u64,
    pub fallback_identity: u64,
}
