//! Per-state task counts, kept in first-seen order

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Synthetic key holding the number of tasks
pub const TOTAL_KEY: &str = "Total";

/// Insertion-ordered `state -> count` map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateHistogram {
    entries: Vec<(String, usize)>,
}

impl StateHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to `key`, appending it with count 1 on first sight
    pub fn increment(&mut self, key: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((key.to_string(), 1)),
        }
    }

    /// Overwrite `key` in place, or append it
    pub fn set(&mut self, key: &str, value: usize) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, count)) => *count = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for StateHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}
