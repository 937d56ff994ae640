//! Add-only property map for a single file.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Properties of one file, keyed by name.
///
/// Keys are only ever added: [`PropertyMap::insert`] refuses to replace an
/// existing entry, so a value retrieved from the platform is never shadowed
/// by one computed later.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap {
    entries: BTreeMap<String, Value>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` under `key` unless the key already exists.
    ///
    /// Returns false, leaving the map untouched, when the key was present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        if self.entries.contains_key(&key) {
            log::debug!("Property '{}' already present, keeping existing value", key);
            return false;
        }
        self.entries.insert(key, value.into());
        true
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Convenience accessor for string-valued properties.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl Serialize for PropertyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_never_overwrites() {
        let mut map = PropertyMap::new();
        assert!(map.insert("System.Size", 10));
        assert!(!map.insert("System.Size", 20));
        assert_eq!(map.get("System.Size"), Some(&json!(10)));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_from_iter_keeps_first_value() {
        let map: PropertyMap = vec![("a", json!(1)), ("b", json!("x")), ("a", json!(2))]
            .into_iter()
            .collect();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&json!(1)));
        assert_eq!(map.get_str("b"), Some("x"));
    }

    #[test]
    fn test_serializes_as_sorted_object() {
        let map: PropertyMap = vec![("z", json!(1)), ("a", json!({"k": "v"}))]
            .into_iter()
            .collect();
        let text = serde_json::to_string(&map).unwrap();
        assert_eq!(text, r#"{"a":{"k":"v"},"z":1}"#);
    }
}
