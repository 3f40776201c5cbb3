//! FX rate caching with TTL support.

use chrono::Duration;
use dashmap::DashMap;
use parking_lot::RwLock;
use ratewise_common::{constants, CurrencyPair, SharedClock, SystemClock, Timestamp};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Which fetch time an entry's freshness is judged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TtlScope {
    /// One timestamp for the whole cache, refreshed by any remote fetch.
    #[default]
    Shared,
    /// Each pair expires one TTL after its own fetch.
    PerPair,
}

impl std::str::FromStr for TtlScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(TtlScope::Shared),
            "per-pair" | "per_pair" | "perpair" => Ok(TtlScope::PerPair),
            other => Err(format!("Unknown TTL scope '{}'", other)),
        }
    }
}

/// Cached rate entry.
#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    rate: f64,
    fetched_at: Timestamp,
}

/// Configuration for rate cache.
#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    /// How long a fetched rate stays fresh.
    pub ttl: Duration,
    /// Whether the TTL window is shared across pairs.
    pub scope: TtlScope,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            ttl: constants::cache_ttl(),
            scope: TtlScope::Shared,
        }
    }
}

/// Rate cache keyed by ordered currency pair.
///
/// Entries are never evicted on read; a stale entry is simply ignored and
/// overwritten by the next successful fetch.
pub struct RateCache {
    entries: DashMap<CurrencyPair, CacheEntry>,
    last_fetch: RwLock<Option<Timestamp>>,
    config: RateCacheConfig,
    clock: SharedClock,
}

impl RateCache {
    /// Create a new rate cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(RateCacheConfig::default())
    }

    /// Create a new rate cache with custom configuration.
    pub fn with_config(config: RateCacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a rate cache that reads time from `clock`.
    pub fn with_clock(config: RateCacheConfig, clock: SharedClock) -> Self {
        Self {
            entries: DashMap::new(),
            last_fetch: RwLock::new(None),
            config,
            clock,
        }
    }

    /// Get a rate from cache if still fresh.
    pub fn get(&self, pair: &CurrencyPair) -> Option<f64> {
        let entry = match self.entries.get(pair) {
            Some(entry) => *entry,
            None => {
                debug!(pair = %pair, "Cache miss");
                return None;
            }
        };

        if self.is_fresh(&entry) {
            debug!(pair = %pair, "Cache hit");
            Some(entry.rate)
        } else {
            debug!(pair = %pair, "Cache entry expired");
            None
        }
    }

    /// Store a freshly fetched rate and restart the TTL window.
    pub fn insert(&self, pair: CurrencyPair, rate: f64) {
        let now = self.clock.now();
        self.entries.insert(
            pair,
            CacheEntry {
                rate,
                fetched_at: now,
            },
        );
        *self.last_fetch.write() = Some(now);
    }

    /// Time of the most recent successful fetch for any pair.
    pub fn last_fetch(&self) -> Option<Timestamp> {
        *self.last_fetch.read()
    }

    /// Clear all cached rates.
    pub fn clear(&self) {
        self.entries.clear();
        *self.last_fetch.write() = None;
    }

    /// Get the number of entries in cache, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &RateCacheConfig {
        &self.config
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let total = self.entries.len();
        let fresh = self.entries.iter().filter(|e| self.is_fresh(e.value())).count();

        CacheStats {
            total_entries: total,
            fresh_entries: fresh,
            stale_entries: total - fresh,
            last_fetch: self.last_fetch(),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        let anchor = match self.config.scope {
            TtlScope::Shared => match self.last_fetch() {
                Some(ts) => ts,
                None => return false,
            },
            TtlScope::PerPair => entry.fetched_at,
        };

        self.clock.now().signed_duration_since(anchor) < self.config.ttl
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub fresh_entries: usize,
    pub stale_entries: usize,
    pub last_fetch: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratewise_common::ManualClock;

    fn cache_with(scope: TtlScope) -> (RateCache, ManualClock) {
        let clock = ManualClock::default();
        let config = RateCacheConfig {
            scope,
            ..Default::default()
        };
        (RateCache::with_clock(config, Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_cache_insert_and_get() {
        let (cache, _clock) = cache_with(TtlScope::Shared);
        let pair = CurrencyPair::new("USD", "EUR");

        cache.insert(pair.clone(), 0.92);

        assert_eq!(cache.get(&pair), Some(0.92));
        assert!(cache.last_fetch().is_some());
    }

    #[test]
    fn test_cache_miss() {
        let cache = RateCache::new();
        let pair = CurrencyPair::new("USD", "EUR");

        assert!(cache.get(&pair).is_none());
    }

    #[test]
    fn test_pair_is_ordered() {
        let (cache, _clock) = cache_with(TtlScope::Shared);
        cache.insert(CurrencyPair::new("USD", "EUR"), 0.92);

        assert!(cache.get(&CurrencyPair::new("EUR", "USD")).is_none());
    }

    #[test]
    fn test_cache_expiry() {
        let (cache, clock) = cache_with(TtlScope::Shared);
        let pair = CurrencyPair::new("USD", "EUR");
        cache.insert(pair.clone(), 0.92);

        clock.advance(Duration::minutes(59));
        assert_eq!(cache.get(&pair), Some(0.92));

        clock.advance(Duration::minutes(1));
        assert!(cache.get(&pair).is_none());
        // Stale entries stay until overwritten.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_shared_scope_refreshes_all_pairs() {
        let (cache, clock) = cache_with(TtlScope::Shared);
        let usd_eur = CurrencyPair::new("USD", "EUR");
        let php_usd = CurrencyPair::new("PHP", "USD");

        cache.insert(usd_eur.clone(), 0.92);
        clock.advance(Duration::minutes(50));
        cache.insert(php_usd.clone(), 0.0177);
        clock.advance(Duration::minutes(20));

        // 70 minutes after its own fetch, but only 20 after the latest one.
        assert_eq!(cache.get(&usd_eur), Some(0.92));
        assert_eq!(cache.get(&php_usd), Some(0.0177));
    }

    #[test]
    fn test_per_pair_scope_expires_independently() {
        let (cache, clock) = cache_with(TtlScope::PerPair);
        let usd_eur = CurrencyPair::new("USD", "EUR");
        let php_usd = CurrencyPair::new("PHP", "USD");

        cache.insert(usd_eur.clone(), 0.92);
        clock.advance(Duration::minutes(50));
        cache.insert(php_usd.clone(), 0.0177);
        clock.advance(Duration::minutes(20));

        assert!(cache.get(&usd_eur).is_none());
        assert_eq!(cache.get(&php_usd), Some(0.0177));
    }

    #[test]
    fn test_cache_clear_and_stats() {
        let (cache, clock) = cache_with(TtlScope::PerPair);
        cache.insert(CurrencyPair::new("USD", "EUR"), 0.92);
        clock.advance(Duration::hours(2));
        cache.insert(CurrencyPair::new("GBP", "USD"), 1.27);

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.fresh_entries, 1);
        assert_eq!(stats.stale_entries, 1);

        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.last_fetch().is_none());
    }

    #[test]
    fn test_ttl_scope_from_str() {
        assert_eq!("shared".parse::<TtlScope>().unwrap(), TtlScope::Shared);
        assert_eq!("Per-Pair".parse::<TtlScope>().unwrap(), TtlScope::PerPair);
        assert!("hourly".parse::<TtlScope>().is_err());
    }
}
