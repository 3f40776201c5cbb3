//! Rate source trait and test doubles.

use async_trait::async_trait;
use ratewise_common::CurrencyPair;

use crate::error::FxResult;

/// One remote tier in the resolution chain.
///
/// A source either returns a usable rate or an error; the resolver treats
/// every error the same way and moves on to the next source.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Source name, used in logs and stats.
    fn name(&self) -> &str;

    /// Fetch the rate for a currency pair.
    async fn fetch(&self, pair: &CurrencyPair) -> FxResult<f64>;
}

/// Scripted rate source for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateSource {
    name: String,
    rates: dashmap::DashMap<CurrencyPair, f64>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateSource {
    /// Create a mock source that knows no rates.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rates: dashmap::DashMap::new(),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Set the rate returned for a currency pair.
    pub fn set_rate(&self, pair: CurrencyPair, rate: f64) {
        self.rates.insert(pair, rate);
    }

    /// Number of fetches made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateSource for MockRateSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, pair: &CurrencyPair) -> FxResult<f64> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let rate = self
            .rates
            .get(pair)
            .map(|r| *r)
            .ok_or_else(|| crate::error::FxError::MissingRate(pair.clone()))?;
        crate::error::FxError::check_rate(pair, rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FxError;

    #[tokio::test]
    async fn test_mock_source() {
        let source = MockRateSource::new("test");
        let pair = CurrencyPair::new("USD", "EUR");
        source.set_rate(pair.clone(), 0.92);

        assert_eq!(source.fetch(&pair).await.unwrap(), 0.92);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_source_missing_and_invalid() {
        let source = MockRateSource::new("test");
        let pair = CurrencyPair::new("USD", "EUR");

        assert!(matches!(
            source.fetch(&pair).await,
            Err(FxError::MissingRate(_))
        ));

        source.set_rate(pair.clone(), 0.0);
        assert!(matches!(
            source.fetch(&pair).await,
            Err(FxError::InvalidRate { .. })
        ));
        assert_eq!(source.calls(), 2);
    }
}
