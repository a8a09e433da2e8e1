//! Ordered element attributes.

use std::collections::HashMap;

/// Attribute map that remembers insertion order.
///
/// Keys are unique. Re-setting an existing key keeps its original position,
/// so serialization order is stable across edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    order: Vec<String>,
    values: HashMap<String, String>,
}

impl Attributes {
    /// Create an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an attribute value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set an attribute, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        if !self.values.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.values.insert(key, value.into())
    }

    /// Remove an attribute, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let value = self.values.remove(key)?;
        self.order.retain(|k| k != key);
        Some(value)
    }

    /// Returns true if the attribute is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The `index`-th attribute in insertion order.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<(&str, &str)> {
        let key = self.order.get(index)?;
        Some((key.as_str(), self.values.get(key)?.as_str()))
    }

    /// Attribute names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|k| Some((k.as_str(), self.values.get(k)?.as_str())))
    }

    /// Copy every attribute of `other` into `self`.
    pub fn update_from(&mut self, other: &Self) {
        for (k, v) in other.iter() {
            let _ = self.set(k, v);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (k, v) in iter {
            let _ = attrs.set(k, v);
        }
        attrs
    }
}
