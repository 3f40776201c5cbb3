//! Ratewise Common Types
//!
//! Shared types used across the Ratewise crates: currency codes, currency
//! pairs and the clock abstraction used for cache expiry.

pub mod currency;
pub mod time;

pub use currency::*;
pub use time::*;
