//! Ratewise Server
//!
//! HTTP front end for the rate resolver: exchange rates, spoken
//! announcements and resolver statistics.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;

use std::sync::Arc;

use ratewise_fx::{ExchangeRateApi, RateResolver, RateSource};
use tracing::warn;

pub use api::{app_router, AppState};
pub use config::ServerConfig;
pub use error::ApiError;

/// Build shared state from configuration.
///
/// Without an API key no remote sources are configured and every request is
/// answered from the fallback table.
pub fn build_state(config: &ServerConfig) -> AppState {
    let sources: Vec<Arc<dyn RateSource>> = if config.has_api_key() {
        ExchangeRateApi::new(config.upstream_config()).into_sources()
    } else {
        warn!("EXCHANGE_RATE_API_KEY not set; serving fallback rates only");
        Vec::new()
    };

    let resolver = RateResolver::new(sources, config.resolver_config());
    AppState {
        resolver: Arc::new(resolver),
    }
}
