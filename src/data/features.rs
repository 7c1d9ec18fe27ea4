//! Caller-supplied feature maps

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Named numeric inputs for a prediction.
///
/// Lookups never fail: an absent key resolves to the default the caller passes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Features(HashMap<String, f64>);

impl Features {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    pub fn insert(&mut self, key: &str, value: f64) {
        self.0.insert(key.to_string(), value);
    }

    /// Value for `key`, or `default` when absent
    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.0.get(key).copied().unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, f64>> for Features {
    fn from(map: HashMap<String, f64>) -> Self {
        Self(map)
    }
}

impl<'a> FromIterator<(&'a str, f64)> for Features {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_use_defaults() {
        let features = Features::new().with("depth", 12.0);
        assert_eq!(features.get_or("depth", 30.0), 12.0);
        assert_eq!(features.get_or("recent_magnitude", 2.5), 2.5);
    }

    #[test]
    fn test_deserializes_from_plain_map() {
        let features: Features = serde_json::from_str(r#"{"rainfall": 80.5}"#).unwrap();
        assert_eq!(features.get_or("rainfall", 20.0), 80.5);
        assert_eq!(features.len(), 1);
    }
}
