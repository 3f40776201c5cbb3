//! Static approximate rates used when every remote source has failed.

use ratewise_common::{Currency, CurrencyPair};
use serde::Serialize;
use std::collections::HashMap;

/// Approximate rates, anchored around PHP, USD and EUR.
const STATIC_RATES: &[(&str, &str, f64)] = &[
    ("PHP", "USD", 0.0177),
    ("PHP", "EUR", 0.0163),
    ("USD", "PHP", 56.45),
    ("USD", "EUR", 0.92),
    ("USD", "GBP", 0.79),
    ("USD", "JPY", 151.5),
    ("USD", "CNY", 7.24),
    ("USD", "AUD", 1.52),
    ("USD", "CAD", 1.36),
    ("EUR", "USD", 1.09),
    ("EUR", "PHP", 61.35),
    ("GBP", "USD", 1.27),
    ("JPY", "USD", 0.0066),
    ("CNY", "USD", 0.138),
    ("AUD", "USD", 0.66),
    ("CAD", "USD", 0.74),
];

/// How a fallback rate was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackKind {
    /// Direct table entry.
    Direct,
    /// Product of the `from -> USD` and `USD -> to` entries.
    ViaUsd,
    /// Nothing applied; rate is 1.0.
    Identity,
}

/// Two-level table: source code -> target code -> rate.
#[derive(Debug, Clone)]
pub struct FallbackTable {
    rates: HashMap<Currency, HashMap<Currency, f64>>,
}

impl FallbackTable {
    /// Create an empty table.
    pub fn empty() -> Self {
        Self {
            rates: HashMap::new(),
        }
    }

    /// Add or replace an entry.
    pub fn with_rate(mut self, from: impl Into<Currency>, to: impl Into<Currency>, rate: f64) -> Self {
        self.insert(from, to, rate);
        self
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, from: impl Into<Currency>, to: impl Into<Currency>, rate: f64) {
        self.rates
            .entry(from.into())
            .or_default()
            .insert(to.into(), rate);
    }

    /// Direct table entry, if any.
    pub fn direct(&self, pair: &CurrencyPair) -> Option<f64> {
        self.rates.get(&pair.base)?.get(&pair.quote).copied()
    }

    /// Rate composed through USD. Only applies when neither side is USD.
    pub fn via_usd(&self, pair: &CurrencyPair) -> Option<f64> {
        if pair.base.is_usd() || pair.quote.is_usd() {
            return None;
        }
        let usd = Currency::usd();
        let to_usd = self.direct(&CurrencyPair::new(pair.base.clone(), usd.clone()))?;
        let from_usd = self.direct(&CurrencyPair::new(usd, pair.quote.clone()))?;
        Some(to_usd * from_usd)
    }

    /// Resolve a rate, always producing one.
    pub fn resolve(&self, pair: &CurrencyPair) -> (f64, FallbackKind) {
        if let Some(rate) = self.direct(pair) {
            return (rate, FallbackKind::Direct);
        }
        if let Some(rate) = self.via_usd(pair) {
            return (rate, FallbackKind::ViaUsd);
        }
        (1.0, FallbackKind::Identity)
    }

    /// Number of direct entries.
    pub fn len(&self) -> usize {
        self.rates.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FallbackTable {
    fn default() -> Self {
        STATIC_RATES
            .iter()
            .fold(Self::empty(), |table, (from, to, rate)| {
                table.with_rate(*from, *to, *rate)
            })
    }
}
