//! Configuration option map
//!
//! Options are a flat mapping of option name to JSON value. The effective
//! options a consumer sees are merged at read time: defaults first, then the
//! live configuration on top. Nested objects merge key by key and the
//! override wins on any scalar collision.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Mapping of option name to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    options: BTreeMap<String, Value>,
}

impl Config {
    /// Create an empty config
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// Set an option, returning the previous value
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.options.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.options.remove(key)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.options.iter()
    }

    /// Deep-merge `other` into this config; values from `other` win
    pub fn merge(&mut self, other: &Config) {
        for (key, value) in &other.options {
            match self.options.get_mut(key) {
                Some(existing) => deep_merge(existing, value),
                None => {
                    self.options.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Defaults overlaid with overrides, without touching either
    pub fn with_defaults(defaults: &Config, overrides: &Config) -> Config {
        let mut merged = defaults.clone();
        merged.merge(overrides);
        merged
    }
}

impl FromIterator<(String, Value)> for Config {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            options: iter.into_iter().collect(),
        }
    }
}

/// Recursively merge `overlay` into `base`.
///
/// Objects merge per key. Anything else (including arrays) is replaced.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}
