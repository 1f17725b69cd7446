//! Runtime property store shared between discovery and the aggregation layer
//!
//! Static configuration is read once at startup; values that change while the
//! process runs (the marathon URL override, per-cluster instance URL
//! suffixes published by discovery) live here instead.

use dashmap::DashMap;
use std::collections::BTreeMap;

/// Property holding the marathon apps endpoint
pub const MARATHON_URL_PROPERTY: &str = "turbine.marathon.url";

/// Prefix of the per-cluster instance URL suffix properties
pub const INSTANCE_URL_SUFFIX_PREFIX: &str = "turbine.instanceUrlSuffix.";

/// Property key carrying the instance URL suffix for `cluster`
#[must_use]
pub fn instance_url_suffix_key(cluster: &str) -> String {
    format!("{INSTANCE_URL_SUFFIX_PREFIX}{cluster}")
}

/// Concurrent string-keyed property map
#[derive(Debug, Default)]
pub struct DynamicProperties {
    values: DashMap<String, String>,
}

impl DynamicProperties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.value().clone())
    }

    /// Like [`get`](Self::get) but treats blank values as unset
    pub fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Set a property, returning the previous value
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.values.remove(key).map(|(_, v)| v)
    }

    /// All properties whose key starts with `prefix`, keyed by the remainder
    pub fn with_prefix(&self, prefix: &str) -> BTreeMap<String, String> {
        self.values
            .iter()
            .filter_map(|entry| {
                entry
                    .key()
                    .strip_prefix(prefix)
                    .map(|rest| (rest.to_string(), entry.value().clone()))
            })
            .collect()
    }

    /// Point-in-time copy of every property
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}
