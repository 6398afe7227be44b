//! Unordered sets of document keys returned by lookups and queries.

use std::fmt;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// An unordered set of document keys.
///
/// Complement is not offered here because it needs the document universe;
/// see [`crate::index::InvertedIndex::complement`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentSet {
    docs: AHashSet<String>,
}

impl DocumentSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document key. Returns true if it was not present.
    pub fn insert<S: Into<String>>(&mut self, document: S) -> bool {
        self.docs.insert(document.into())
    }

    /// Whether `document` is in the set.
    pub fn contains(&self, document: &str) -> bool {
        self.docs.contains(document)
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Iterate over the document keys in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.docs.iter().map(String::as_str)
    }

    /// Documents in either set.
    pub fn union(&self, other: &DocumentSet) -> DocumentSet {
        let (large, small) = if self.len() >= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut docs = large.docs.clone();
        docs.extend(small.docs.iter().cloned());
        DocumentSet { docs }
    }

    /// Documents in both sets.
    pub fn intersection(&self, other: &DocumentSet) -> DocumentSet {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .docs
            .iter()
            .filter(|doc| large.docs.contains(*doc))
            .cloned()
            .collect()
    }

    /// Documents in this set but not in `other`.
    pub fn difference(&self, other: &DocumentSet) -> DocumentSet {
        self.docs
            .iter()
            .filter(|doc| !other.docs.contains(*doc))
            .cloned()
            .collect()
    }

    /// Keep only the documents for which `keep` returns true.
    pub fn retain<F: FnMut(&str) -> bool>(&mut self, mut keep: F) {
        self.docs.retain(|doc| keep(doc));
    }

    /// Document keys in ascending order.
    pub fn into_sorted_vec(self) -> Vec<String> {
        let mut docs: Vec<String> = self.docs.into_iter().collect();
        docs.sort_unstable();
        docs
    }
}

impl PartialEq for DocumentSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.docs.iter().all(|doc| other.docs.contains(doc))
    }
}

impl Eq for DocumentSet {}

impl<S: Into<String>> FromIterator<S> for DocumentSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        DocumentSet {
            docs: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for DocumentSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.docs.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for DocumentSet {
    type Item = String;
    type IntoIter = std::collections::hash_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.into_iter()
    }
}

impl fmt::Display for DocumentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut docs: Vec<&str> = self.iter().collect();
        docs.sort_unstable();
        write!(f, "{{{}}}", docs.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(docs: &[&str]) -> DocumentSet {
        docs.iter().copied().collect()
    }

    #[test]
    fn test_set_algebra() {
        let a = set(&["d1", "d2"]);
        let b = set(&["d2", "d3"]);

        assert_eq!(a.union(&b), set(&["d1", "d2", "d3"]));
        assert_eq!(a.intersection(&b), set(&["d2"]));
        assert_eq!(a.difference(&b), set(&["d1"]));
        assert!(a.intersection(&DocumentSet::new()).is_empty());
    }

    #[test]
    fn test_equality_ignores_order() {
        assert_eq!(set(&["x", "y"]), set(&["y", "x"]));
        assert_ne!(set(&["x"]), set(&["x", "y"]));
    }

    #[test]
    fn test_sorted_and_display() {
        let docs = set(&["b", "c", "a"]);
        assert_eq!(docs.to_string(), "{a, b, c}");
        assert_eq!(docs.into_sorted_vec(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_retain() {
        let mut docs = set(&["keep", "drop"]);
        docs.retain(|doc| doc == "keep");
        assert_eq!(docs, set(&["keep"]));
    }
}
