//! Server configuration.

use std::time::Duration;

use ratewise_fx::exchange_rate_api::DEFAULT_BASE_URL;
use ratewise_fx::{ExchangeRateApiConfig, RateCacheConfig, RateResolverConfig, TtlScope};

/// Upstream rate provider configuration.
#[derive(Clone)]
pub struct UpstreamConfig {
    /// API base URL.
    pub base_url: String,
    /// API key. Secret; never logged.
    pub api_key: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Rate cache configuration.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// How long a fetched rate stays fresh.
    pub ttl: Duration,
    /// Whether the TTL window is shared across pairs.
    pub scope: TtlScope,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            scope: TtlScope::Shared,
        }
    }
}

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// Upstream provider configuration.
    pub upstream: UpstreamConfig,
    /// Cache configuration.
    pub cache: CacheSettings,
    /// Require a bearer token on `/api` routes.
    pub require_auth: bool,
    /// Log level.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8080,
            upstream: UpstreamConfig::default(),
            cache: CacheSettings::default(),
            require_auth: false,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("RATEWISE_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Some(port) = lookup("RATEWISE_LISTEN_PORT") {
            if let Ok(port) = port.parse() {
                config.listen_port = port;
            }
        }

        if let Some(key) = lookup("EXCHANGE_RATE_API_KEY") {
            config.upstream.api_key = key;
        }

        if let Some(url) = lookup("EXCHANGE_RATE_API_URL") {
            config.upstream.base_url = url;
        }

        if let Some(secs) = lookup("RATEWISE_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.upstream.request_timeout = Duration::from_secs(secs);
            }
        }

        if let Some(secs) = lookup("RATEWISE_CACHE_TTL_SECS") {
            if let Ok(secs) = secs.parse() {
                config.cache.ttl = Duration::from_secs(secs);
            }
        }

        if let Some(scope) = lookup("RATEWISE_TTL_SCOPE") {
            if let Ok(scope) = scope.parse() {
                config.cache.scope = scope;
            }
        }

        if let Some(flag) = lookup("RATEWISE_REQUIRE_AUTH") {
            config.require_auth = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port == 0 {
            return Err("Listen port cannot be 0".to_string());
        }

        if self.upstream.base_url.is_empty() {
            return Err("Exchange rate API URL cannot be empty".to_string());
        }

        if self.upstream.request_timeout.is_zero() {
            return Err("Request timeout cannot be 0".to_string());
        }

        if self.cache.ttl.is_zero() {
            return Err("Cache TTL cannot be 0".to_string());
        }

        Ok(())
    }

    /// Whether an upstream API key is configured. Without one only the
    /// fallback table answers.
    pub fn has_api_key(&self) -> bool {
        !self.upstream.api_key.trim().is_empty()
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen_addr, self.listen_port)
    }

    /// Upstream client configuration.
    pub fn upstream_config(&self) -> ExchangeRateApiConfig {
        let mut api = ExchangeRateApiConfig::new(self.upstream.api_key.clone())
            .with_base_url(self.upstream.base_url.clone());
        api.request_timeout = self.upstream.request_timeout;
        api
    }

    /// Resolver configuration.
    pub fn resolver_config(&self) -> RateResolverConfig {
        RateResolverConfig {
            cache: RateCacheConfig {
                ttl: chrono::Duration::from_std(self.cache.ttl)
                    .unwrap_or_else(|_| ratewise_common::constants::cache_ttl()),
                scope: self.cache.scope,
            },
            use_cache: true,
        }
    }
}
