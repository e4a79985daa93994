//! Log of measurement results keyed by measurement key.

use rustc_hash::FxHashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use arvak_ir::MeasurementKey;

/// Measurement results of one run, keyed by [`MeasurementKey`].
///
/// Lookups accept plain strings in canonical form. Recording under a key
/// that is already present replaces the earlier results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasurementLog {
    results: FxHashMap<MeasurementKey, Vec<i64>>,
}

impl MeasurementLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `results` under `key`, returning whatever was stored before.
    pub fn record(&mut self, key: MeasurementKey, results: Vec<i64>) -> Option<Vec<i64>> {
        self.results.insert(key, results)
    }

    /// Results stored under the canonical key string.
    pub fn get(&self, key: &str) -> Option<&[i64]> {
        self.results.get(key).map(Vec::as_slice)
    }

    /// Whether anything has been recorded under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.results.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Keys in canonical order.
    pub fn keys(&self) -> Vec<&MeasurementKey> {
        let mut keys: Vec<_> = self.results.keys().collect();
        keys.sort();
        keys
    }

    /// Entries in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = (&MeasurementKey, &[i64])> {
        self.keys()
            .into_iter()
            .map(move |key| (key, self.results[key].as_slice()))
    }
}

impl Serialize for MeasurementLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.results.len()))?;
        for (key, results) in self.iter() {
            map.serialize_entry(key.as_str(), results)?;
        }
        map.end()
    }
}
