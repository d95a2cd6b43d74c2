//! Core type definitions for guide generation

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which side of the board a catalog component sits on
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Role {
    Sensor,
    Output,
}

/// Immutable catalog record for a component the kit ships with
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub pin: &'static str,   // "D7", "A0", or composite "Trig: D5, Echo: D6"
    pub role: Role,
    pub usage: &'static str, // one-line "what it does" sentence for the guide
}

/// Threshold rule applied to an analog reading
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum AnalogRule {
    /// value < 400 means dry soil
    Dry,
    /// value < 300 means dark
    Dark,
    /// value > 600 for any other analog sensor
    High,
}

/// Code-generation category of a sensor, resolved once during classification
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum SensorKind {
    Humidity,
    Distance,
    Analog(AnalogRule),
    Digital,
}

/// A sensor that survived classification, tagged with its kind
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct SelectedSensor {
    pub entry: &'static CatalogEntry, // ordering follows the catalog name
    pub kind: SensorKind,
}

impl SelectedSensor {
    pub fn name(&self) -> &'static str {
        self.entry.name
    }
}

/// Subset of a raw request that matches the catalog, split by role.
///
/// Both sides are ordered sets, so iteration is lexicographic by name and
/// duplicates in the request collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedSelection {
    pub sensors: BTreeSet<SelectedSensor>,
    pub outputs: BTreeSet<&'static CatalogEntry>,
}

impl ClassifiedSelection {
    pub fn sensor_names(&self) -> Vec<&'static str> {
        self.sensors.iter().map(|s| s.name()).collect()
    }

    pub fn output_names(&self) -> Vec<&'static str> {
        self.outputs.iter().map(|o| o.name).collect()
    }

    /// A generation request needs at least one sensor and one output
    pub fn is_complete(&self) -> bool {
        !self.sensors.is_empty() && !self.outputs.is_empty()
    }
}

/// Where a guide came from
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, Default)]
pub enum GuideSource {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "fallback")]
    Fallback,
    #[serde(rename = "fallback-auth")]
    FallbackAuth,
    #[serde(rename = "fallback-rate-limit")]
    FallbackRateLimit,
    #[default]
    #[serde(rename = "cache")]
    Cache,
}

impl GuideSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuideSource::OpenAi => "openai",
            GuideSource::Fallback => "fallback",
            GuideSource::FallbackAuth => "fallback-auth",
            GuideSource::FallbackRateLimit => "fallback-rate-limit",
            GuideSource::Cache => "cache",
        }
    }
}

/// Why the remote path was skipped in favour of the local generator
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FallbackReason {
    NoCredential,
    AuthFailure,
    RateLimited,
}

impl FallbackReason {
    /// Source tag stored alongside the cached result
    pub fn source(&self) -> GuideSource {
        match self {
            FallbackReason::NoCredential => GuideSource::Fallback,
            FallbackReason::AuthFailure => GuideSource::FallbackAuth,
            FallbackReason::RateLimited => GuideSource::FallbackRateLimit,
        }
    }

    /// Informational note returned to the caller
    pub fn note(&self) -> &'static str {
        match self {
            FallbackReason::NoCredential => {
                "Generated without OpenAI because OPENAI_API_KEY is missing."
            }
            FallbackReason::AuthFailure => {
                "Generated without OpenAI because API authentication failed."
            }
            FallbackReason::RateLimited => {
                "Generated without OpenAI because API quota/rate limits were reached."
            }
        }
    }
}

/// Successful answer to a guide request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideResponse {
    pub result: String,
    pub cached: bool,
    pub source: GuideSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
