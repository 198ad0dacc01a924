//! In-memory key-value collection consumed by the table writer

use std::slice;

/// A single key-value pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// Lookup key
    pub key: Vec<u8>,
    /// Stored value
    pub value: Vec<u8>,
}

impl KeyValue {
    /// Create a new pair
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Collection of key-value pairs written as one table
///
/// Pairs may be added in any order; the writer sorts them by key before
/// encoding. Keys are expected to be unique. With duplicate keys, which value
/// a lookup returns is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    entries: Vec<KeyValue>,
}

impl Dictionary {
    /// Create an empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty dictionary with room for `capacity` pairs
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append a pair
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> &mut Self {
        self.entries.push(KeyValue::new(key, value));
        self
    }

    /// Append an existing pair
    pub fn push(&mut self, entry: KeyValue) {
        self.entries.push(entry);
    }

    /// Sort ascending by key using bytewise comparison
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.key.cmp(&b.key));
    }

    /// Check whether the pairs are already in ascending key order
    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].key <= w[1].key)
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the dictionary is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over pairs in their current order
    pub fn iter(&self) -> slice::Iter<'_, KeyValue> {
        self.entries.iter()
    }

    /// Borrow the pairs as a slice
    pub fn entries(&self) -> &[KeyValue] {
        &self.entries
    }

    /// Remove all pairs, keeping the allocation
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl FromIterator<KeyValue> for Dictionary {
    fn from_iter<I: IntoIterator<Item = KeyValue>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K: Into<Vec<u8>>, V: Into<Vec<u8>>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(k, v)| KeyValue::new(k, v))
            .collect()
    }
}

impl Extend<KeyValue> for Dictionary {
    fn extend<I: IntoIterator<Item = KeyValue>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = &'a KeyValue;
    type IntoIter = slice::Iter<'a, KeyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Dictionary {
    type Item = KeyValue;
    type IntoIter = std::vec::IntoIter<KeyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
