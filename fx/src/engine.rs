//! Rate resolver: cache, remote sources in order, then the fallback table.

use std::sync::Arc;

use ratewise_common::{Currency, CurrencyPair, SharedClock, SystemClock};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::cache::{CacheStats, RateCache, RateCacheConfig};
use crate::conversion::{Conversion, RateQuery};
use crate::fallback::{FallbackKind, FallbackTable};
use crate::metrics::{MetricsSnapshot, ResolverMetrics};
use crate::provider::RateSource;

/// Configuration for the rate resolver.
#[derive(Debug, Clone)]
pub struct RateResolverConfig {
    /// Cache configuration.
    pub cache: RateCacheConfig,
    /// Whether to consult and populate the cache.
    pub use_cache: bool,
}

impl Default for RateResolverConfig {
    fn default() -> Self {
        Self {
            cache: RateCacheConfig::default(),
            use_cache: true,
        }
    }
}

/// Where a resolved rate came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RateOrigin {
    Cache,
    Source(String),
    Fallback(FallbackKind),
}

/// A resolved rate and its origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub rate: f64,
    pub origin: RateOrigin,
}

/// Resolves conversion rates, degrading through fallbacks instead of failing.
///
/// Remote sources are tried in the order given. Any source error moves on to
/// the next one; once all have failed the static [`FallbackTable`] answers.
/// Resolution therefore always yields a finite rate greater than zero.
pub struct RateResolver {
    sources: Vec<Arc<dyn RateSource>>,
    cache: RateCache,
    fallback: FallbackTable,
    metrics: ResolverMetrics,
    clock: SharedClock,
    config: RateResolverConfig,
}

impl RateResolver {
    /// Create a resolver over the given remote sources.
    pub fn new(sources: Vec<Arc<dyn RateSource>>, config: RateResolverConfig) -> Self {
        Self::with_clock(sources, config, Arc::new(SystemClock))
    }

    /// Create a resolver that reads time from `clock`.
    pub fn with_clock(
        sources: Vec<Arc<dyn RateSource>>,
        config: RateResolverConfig,
        clock: SharedClock,
    ) -> Self {
        Self {
            sources,
            cache: RateCache::with_clock(config.cache.clone(), clock.clone()),
            fallback: FallbackTable::default(),
            metrics: ResolverMetrics::new(),
            clock,
            config,
        }
    }

    /// Replace the static fallback table.
    pub fn with_fallback(mut self, fallback: FallbackTable) -> Self {
        self.fallback = fallback;
        self
    }

    /// Resolve the rate for a pair, reporting where it came from.
    #[instrument(skip_all, fields(pair = %pair))]
    pub async fn resolve(&self, pair: &CurrencyPair) -> Resolution {
        self.metrics.request();

        if self.config.use_cache {
            if let Some(rate) = self.cache.get(pair) {
                debug!("Using cached rate");
                self.metrics.cache_hit();
                return Resolution {
                    rate,
                    origin: RateOrigin::Cache,
                };
            }
        }

        for source in &self.sources {
            match source.fetch(pair).await {
                Ok(rate) => {
                    debug!(source = source.name(), rate, "Got rate from source");
                    self.metrics.source_hit(source.name());
                    if self.config.use_cache {
                        self.cache.insert(pair.clone(), rate);
                    }
                    return Resolution {
                        rate,
                        origin: RateOrigin::Source(source.name().to_string()),
                    };
                }
                Err(e) => {
                    warn!(
                        source = source.name(),
                        error = %e,
                        "Rate source failed, trying next tier"
                    );
                    self.metrics.source_failure(source.name());
                }
            }
        }

        let (rate, kind) = self.fallback.resolve(pair);
        info!(rate, fallback = ?kind, "Using fallback rate");
        self.metrics.fallback(kind);

        Resolution {
            rate,
            origin: RateOrigin::Fallback(kind),
        }
    }

    /// Get the conversion rate for a query.
    pub async fn get_rate(&self, query: &RateQuery) -> f64 {
        self.resolve(&query.pair()).await.rate
    }

    /// Get the conversion rate between two currencies.
    pub async fn get_rate_for(&self, from: impl Into<Currency>, to: impl Into<Currency>) -> f64 {
        self.get_rate(&RateQuery::new(from, to)).await
    }

    /// Convert an amount: `amount * rate`.
    pub async fn convert(&self, amount: f64, query: &RateQuery) -> f64 {
        amount * self.get_rate(query).await
    }

    /// Convert an amount and return the full record.
    pub async fn quote(&self, query: RateQuery, amount: f64) -> Conversion {
        let rate = self.get_rate(&query).await;
        Conversion::new(query, amount, rate, self.clock.now())
    }

    /// Get the rate cache.
    pub fn cache(&self) -> &RateCache {
        &self.cache
    }

    /// Names of the remote sources, in resolution order.
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Get resolver statistics.
    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            sources: self.source_names(),
            metrics: self.metrics.snapshot(),
            cache: self.cache.stats(),
        }
    }
}

/// Resolver statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ResolverStats {
    pub sources: Vec<String>,
    pub metrics: MetricsSnapshot,
    pub cache: CacheStats,
}

/// Shared rate resolver.
pub type SharedRateResolver = Arc<RateResolver>;
