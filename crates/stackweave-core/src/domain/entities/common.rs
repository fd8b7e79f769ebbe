use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key/value tags attached to a stack or a resource.
///
/// Ordered so rendered manifests are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries not already present in `self` are taken from `other`.
    pub fn merged_with(&self, other: &Tags) -> Tags {
        let mut merged = other.clone();
        merged.0.extend(self.0.clone());
        merged
    }
}

/// Anything that can carry tags.
pub trait Taggable {
    /// Set `key` to `value`, overwriting a previous value.
    fn set_tag(&mut self, key: &str, value: &str);
}

impl Taggable for Tags {
    fn set_tag(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }
}
