//! FX error types.
//!
//! None of these reach callers of [`RateResolver`](crate::RateResolver); they
//! mark a tier as failed so resolution can move on to the next one.

use ratewise_common::{Currency, CurrencyPair};
use thiserror::Error;

/// Errors that can occur while fetching a rate from a remote source.
#[derive(Debug, Error)]
pub enum FxError {
    /// Request could not be sent or the connection failed.
    #[error("Transport error from {source_name}: {message}")]
    Transport {
        source_name: String,
        message: String,
    },

    /// Upstream answered with a non-success HTTP status.
    #[error("Unexpected HTTP status {status} from {source_name}")]
    UnexpectedStatus { source_name: String, status: u16 },

    /// Response body could not be decoded.
    #[error("Malformed response from {source_name}: {message}")]
    Decode {
        source_name: String,
        message: String,
    },

    /// Upstream decoded fine but reported a non-success result.
    #[error("{source_name} reported result '{result}'")]
    Unsuccessful { source_name: String, result: String },

    /// Response did not carry a rate for the requested pair.
    #[error("No rate for {0} in response")]
    MissingRate(CurrencyPair),

    /// Code cannot be placed in a request; no request was sent.
    #[error("Unsupported currency code '{0}'")]
    InvalidCurrency(Currency),

    /// Configured base URL cannot carry a request path.
    #[error("Invalid base URL for {source_name}: {message}")]
    InvalidUrl {
        source_name: String,
        message: String,
    },

    /// Rate was zero, negative or not finite.
    #[error("Invalid rate {rate} for {pair}")]
    InvalidRate { pair: CurrencyPair, rate: f64 },
}

impl FxError {
    /// Check the rate is usable, returning it unchanged if so.
    pub fn check_rate(pair: &CurrencyPair, rate: f64) -> FxResult<f64> {
        if rate.is_finite() && rate > 0.0 {
            Ok(rate)
        } else {
            Err(FxError::InvalidRate {
                pair: pair.clone(),
                rate,
            })
        }
    }

    /// Check every code of the pair can be sent upstream.
    pub fn check_pair(pair: &CurrencyPair) -> FxResult<()> {
        [&pair.base, &pair.quote]
            .into_iter()
            .find(|c| !c.is_alphanumeric())
            .map_or(Ok(()), |c| Err(FxError::InvalidCurrency(c.clone())))
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
