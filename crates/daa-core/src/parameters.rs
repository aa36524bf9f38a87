//! String-keyed parameter tables for configuration round-trip.
//!
//! Detectors and alerters serialize their thresholds into a
//! `ParameterData` map whose entries carry the internal (SI) value plus
//! the unit tag the value was originally given in, so that formatted
//! output can echo the user's units. Keys are case-preserving and
//! ordered for reproducible output.

use std::collections::BTreeMap;

use daa_kinematics::units;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterEntry {
    /// Internal (SI) value for numeric entries, verbatim text otherwise.
    pub value: String,
    /// Unit tag for numeric entries; "unspecified" for text.
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterData {
    entries: BTreeMap<String, ParameterEntry>,
}

impl ParameterData {
    pub fn new() -> Self {
        ParameterData::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Store a text value.
    pub fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(
            key.to_string(),
            ParameterEntry {
                value: value.to_string(),
                unit: "unspecified".to_string(),
            },
        );
    }

    /// Store an internal (SI) value together with its display unit.
    pub fn set_internal(&mut self, key: &str, value: f64, unit: &str) {
        self.entries.insert(
            key.to_string(),
            ParameterEntry {
                value: format!("{value:?}"),
                unit: unit.to_string(),
            },
        );
    }

    /// Store a value expressed in `unit`, converting to SI.
    pub fn set_value(&mut self, key: &str, value: f64, unit: &str) {
        self.set_internal(key, units::from(unit, value), unit);
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set(key, if value { "true" } else { "false" });
    }

    /// Internal (SI) numeric value; 0.0 when missing or non-numeric.
    pub fn get_value(&self, key: &str) -> f64 {
        self.entries
            .get(key)
            .and_then(|e| e.value.parse::<f64>().ok())
            .unwrap_or(0.0)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.value.as_str())
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get_string(key) == Some("true")
    }

    /// Unit tag of an entry; "unspecified" when missing.
    pub fn unit(&self, key: &str) -> &str {
        self.entries
            .get(key)
            .map(|e| e.unit.as_str())
            .unwrap_or("unspecified")
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Merge `other` into `self`, overwriting existing keys.
    pub fn copy_from(&mut self, other: &ParameterData) {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }

    /// A copy of this table with every key prefixed.
    pub fn copy_with_prefix(&self, prefix: &str) -> ParameterData {
        let mut out = ParameterData::new();
        for (k, v) in &self.entries {
            out.entries.insert(format!("{prefix}{k}"), v.clone());
        }
        out
    }

    /// The sub-table of entries whose keys start with `prefix`, with the
    /// prefix stripped.
    pub fn extract_prefix(&self, prefix: &str) -> ParameterData {
        let mut out = ParameterData::new();
        for (k, v) in &self.entries {
            if let Some(stripped) = k.strip_prefix(prefix) {
                out.entries.insert(stripped.to_string(), v.clone());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_round_trip() {
        let mut p = ParameterData::new();
        p.set_value("WCV_DTHR", 0.66, "nmi");
        assert!((p.get_value("WCV_DTHR") - 0.66 * 1852.0).abs() < 1e-9);
        assert_eq!(p.unit("WCV_DTHR"), "nmi");
        // exact bit round-trip of the internal value
        p.set_internal("x", 0.1 + 0.2, "m");
        assert_eq!(p.get_value("x"), 0.1 + 0.2);
    }

    #[test]
    fn test_prefix_operations() {
        let mut p = ParameterData::new();
        p.set_internal("alerting_time", 55.0, "s");
        p.set("region", "MID");
        let prefixed = p.copy_with_prefix("alert_2_");
        assert!(prefixed.contains("alert_2_region"));
        let sub = prefixed.extract_prefix("alert_2_");
        assert_eq!(sub, p);
        assert!(prefixed.extract_prefix("alert_3_").is_empty());
    }

    #[test]
    fn test_missing_entries_are_benign() {
        let p = ParameterData::new();
        assert_eq!(p.get_value("nope"), 0.0);
        assert_eq!(p.unit("nope"), "unspecified");
        assert!(!p.get_bool("nope"));
    }
}
