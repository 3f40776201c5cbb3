//! Spoken announcements of converted amounts.
//!
//! Builds the text and voice settings handed to a speech synthesizer. The
//! synthesis itself happens client-side.

use ratewise_common::Currency;
use serde::{Deserialize, Serialize};

/// Full English name for a currency code, or the code itself if unknown.
pub fn currency_name(currency: &Currency) -> &str {
    match currency.code() {
        "PHP" => "Philippine Peso",
        "USD" => "US Dollar",
        "EUR" => "Euro",
        "GBP" => "British Pound",
        "JPY" => "Japanese Yen",
        "CNY" => "Chinese Yuan",
        "AUD" => "Australian Dollar",
        "CAD" => "Canadian Dollar",
        other => other,
    }
}

/// Format an amount and currency for speech, e.g. `"25 Philippine Peso"`.
///
/// A missing or blank amount is spoken as "unknown amount". Any other text,
/// including `"0"`, is spoken as given.
pub fn format_for_speech(amount: Option<&str>, currency: &Currency) -> String {
    let amount = amount
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or("unknown amount");

    format!("{} {}", amount, currency_name(currency))
}

/// Voice parameters for an utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechSettings {
    /// BCP 47 language tag.
    pub lang: String,
    /// Speaking rate, 0.1 to 10.
    pub rate: f32,
    /// Pitch, 0 to 2.
    pub pitch: f32,
    /// Volume, 0 to 1.
    pub volume: f32,
}

impl SpeechSettings {
    /// Clamp every value into its supported range.
    pub fn clamped(self) -> Self {
        Self {
            lang: self.lang,
            rate: clamp_or(self.rate, 0.1, 10.0, 1.0),
            pitch: clamp_or(self.pitch, 0.0, 2.0, 2.0),
            volume: clamp_or(self.volume, 0.0, 1.0, 1.0),
        }
    }
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            lang: "en-US".to_string(),
            rate: 1.0,
            pitch: 2.0,
            volume: 1.0,
        }
    }
}

fn clamp_or(value: f32, min: f32, max: f32, default: f32) -> f32 {
    if value.is_nan() {
        default
    } else {
        value.clamp(min, max)
    }
}

/// Text to speak and how to speak it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub text: String,
    pub settings: SpeechSettings,
}

impl Announcement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            settings: SpeechSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SpeechSettings) -> Self {
        self.settings = settings.clamped();
        self
    }
}

/// Announce a detected bill: `"Detected 500 Philippine Peso."`, followed by
/// `extra` when given.
pub fn announce_bill(amount: Option<&str>, currency: &Currency, extra: Option<&str>) -> Announcement {
    let formatted = format_for_speech(amount, currency);
    let text = match extra.map(str::trim).filter(|e| !e.is_empty()) {
        Some(extra) => format!("Detected {}. {}", formatted, extra),
        None => format!("Detected {}.", formatted),
    };
    Announcement::new(text)
}
