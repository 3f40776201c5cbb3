//! Rate queries and conversion records.

use ratewise_common::{to_iso8601, Currency, CurrencyPair, Timestamp};
use serde::{Deserialize, Serialize};

/// A request for the rate between two currencies.
///
/// Defaults to PHP -> USD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateQuery {
    /// Source currency.
    pub from: Currency,
    /// Target currency.
    pub to: Currency,
}

impl RateQuery {
    pub fn new(from: impl Into<Currency>, to: impl Into<Currency>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.from.clone(), self.to.clone())
    }
}

impl Default for RateQuery {
    fn default() -> Self {
        Self::new(Currency::php(), Currency::usd())
    }
}

impl From<RateQuery> for CurrencyPair {
    fn from(query: RateQuery) -> Self {
        CurrencyPair::new(query.from, query.to)
    }
}

/// A resolved conversion, as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub from: Currency,
    pub to: Currency,
    pub amount: f64,
    pub rate: f64,
    pub converted: f64,
    /// ISO-8601 UTC time the conversion was made.
    pub timestamp: String,
}

impl Conversion {
    pub fn new(query: RateQuery, amount: f64, rate: f64, at: Timestamp) -> Self {
        Self {
            from: query.from,
            to: query.to,
            amount,
            rate,
            converted: amount * rate,
            timestamp: to_iso8601(at),
        }
    }
}
