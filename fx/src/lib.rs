//! Ratewise FX
//!
//! Best-effort exchange rate resolution for currency conversion.
//!
//! # Features
//!
//! - Remote lookups against exchangerate-api.com (pair, then latest rates)
//! - Rate caching with a configurable TTL
//! - Static fallback table with USD-pivot derivation
//! - Spoken announcement text for converted amounts
//!
//! # Example
//!
//! ```rust,ignore
//! use ratewise_fx::{ExchangeRateApi, ExchangeRateApiConfig, RateQuery, RateResolver, RateResolverConfig};
//!
//! let api = ExchangeRateApi::new(ExchangeRateApiConfig::new(api_key));
//! let resolver = RateResolver::new(api.into_sources(), RateResolverConfig::default());
//!
//! // Never fails; degrades to fallback rates
//! let rate = resolver.get_rate(&RateQuery::new("USD", "EUR")).await;
//! let eur = resolver.convert(50.0, &RateQuery::new("USD", "EUR")).await;
//! ```

pub mod announce;
pub mod cache;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod exchange_rate_api;
pub mod fallback;
pub mod metrics;
pub mod provider;

pub use announce::{announce_bill, Announcement, SpeechSettings};
pub use cache::{RateCache, RateCacheConfig, TtlScope};
pub use conversion::{Conversion, RateQuery};
pub use engine::{RateOrigin, RateResolver, RateResolverConfig, Resolution, ResolverStats, SharedRateResolver};
pub use error::{FxError, FxResult};
pub use exchange_rate_api::{ExchangeRateApi, ExchangeRateApiConfig, LatestRatesLookup, PairLookup};
pub use fallback::{FallbackKind, FallbackTable};
pub use provider::RateSource;

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateSource;
