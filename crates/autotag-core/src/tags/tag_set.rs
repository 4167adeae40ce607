//! A deduplicated, lexicographically ordered set of tags.
//!
//! Tags read back from image metadata arrive as one separator-joined string.
//! `TagSet` parses that string, unions it with freshly detected labels and
//! serializes the result in sorted order, so the stored value only depends on
//! which tags are present and never on the order they were seen in.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Sorted set of tag strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet {
    tags: BTreeSet<String>,
}

impl TagSet {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a separator-joined metadata value.
    ///
    /// The value is split on `separator` exactly as configured, so a tag
    /// containing a bare comma survives a `", "` separator. Entries are
    /// trimmed and empty entries are dropped; blank output from the metadata
    /// tool yields an empty set.
    pub fn from_metadata(value: &str, separator: &str) -> Self {
        let value = value.trim();
        if value.is_empty() {
            return Self::new();
        }
        if separator.is_empty() {
            return std::iter::once(value).collect();
        }

        let tags = value
            .split(separator)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self { tags }
    }

    /// Insert a single tag. Returns `true` if it was not already present.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return false;
        }
        if trimmed.len() == tag.len() {
            self.tags.insert(tag)
        } else {
            self.tags.insert(trimmed.to_string())
        }
    }

    /// Add every tag from `other` into this set.
    pub fn merge(&mut self, other: &TagSet) {
        self.tags.extend(other.tags.iter().cloned());
    }

    /// Union of two sets, leaving both inputs untouched.
    pub fn union(&self, other: &TagSet) -> TagSet {
        let mut merged = self.clone();
        merged.merge(other);
        merged
    }

    /// Join the tags in sorted order with `separator`.
    pub fn to_metadata_string(&self, separator: &str) -> String {
        self.tags
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Whether `tag` is in the set.
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Iterate tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Sorted tags as an owned list.
    pub fn to_vec(&self) -> Vec<String> {
        self.tags.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for TagSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for tag in iter {
            self.insert(tag);
        }
    }
}

impl IntoIterator for TagSet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.into_iter()
    }
}
