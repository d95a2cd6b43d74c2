//! Canonical, order-independent cache keys for component combinations

use crate::types::ClassifiedSelection;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Layout version of the persisted cache document
pub const CACHE_VERSION: u32 = 1;

/// Bump whenever the local generator or the remote prompt changes meaning
pub const LOGIC_VERSION: &str = "v6";

/// Identity of a (sensors, outputs) combination under the current logic
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CacheKey(String);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyParts<'a> {
    version: u32,
    prompt_version: &'a str,
    sensors: BTreeSet<&'a str>,
    outputs: BTreeSet<&'a str>,
}

impl CacheKey {
    /// Build a key from two name collections; order and repetition are ignored
    pub fn build<I, J, S, T>(sensors: I, outputs: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let sensors: Vec<S> = sensors.into_iter().collect();
        let outputs: Vec<T> = outputs.into_iter().collect();

        let parts = KeyParts {
            version: CACHE_VERSION,
            prompt_version: LOGIC_VERSION,
            sensors: sensors.iter().map(|s| s.as_ref()).collect(),
            outputs: outputs.iter().map(|o| o.as_ref()).collect(),
        };

        // A struct of integers, strings and string sets always serializes
        Self(serde_json::to_string(&parts).unwrap_or_default())
    }

    pub fn for_selection(selection: &ClassifiedSelection) -> Self {
        Self::build(selection.sensor_names(), selection.output_names())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::classify;

    #[test]
    fn test_key_ignores_order() {
        let a = CacheKey::build(["Light Sensor", "Moisture Sensor"], ["Relay", "Buzzer"]);
        let b = CacheKey::build(["Moisture Sensor", "Light Sensor"], ["Buzzer", "Relay"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_ignores_duplicates() {
        let a = CacheKey::build(["Moisture Sensor"], ["Buzzer"]);
        let b = CacheKey::build(["Moisture Sensor", "Moisture Sensor"], ["Buzzer", "Buzzer"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_distinguishes_roles() {
        let a = CacheKey::build(["Relay"], Vec::<&str>::new());
        let b = CacheKey::build(Vec::<&str>::new(), ["Relay"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_layout() {
        let key = CacheKey::build(["Moisture Sensor"], ["Power LED"]);
        assert_eq!(
            key.as_str(),
            r#"{"version":1,"promptVersion":"v6","sensors":["Moisture Sensor"],"outputs":["Power LED"]}"#
        );
    }

    #[test]
    fn test_selection_key_matches_any_request_order() {
        let a = classify(&["Buzzer", "Distance Sensor", "Motion Sensor", "Unknown"]);
        let b = classify(&["Motion Sensor", "Buzzer", "Distance Sensor", "Buzzer"]);
        assert_eq!(CacheKey::for_selection(&a), CacheKey::for_selection(&b));
    }
}
