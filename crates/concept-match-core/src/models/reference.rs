//! Reference-terminology models.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matcher::{normalize, LabelRule};

/// One concept from a reference terminology (PIH, CIEL, or the WHO ICD
/// cross-reference).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceEntry {
    /// Concept code, e.g. `3467` or `CIEL:71160`.
    pub concept_code: String,
    /// The label as it appears in the terminology export.
    pub raw_label: String,
    /// Comparable key derived from `raw_label`.
    pub normalized_label: String,
}

impl ReferenceEntry {
    /// Build an entry, deriving the normalized label with `rule`.
    pub fn new(concept_code: String, raw_label: String, rule: LabelRule) -> Self {
        let normalized_label = normalize(&raw_label, rule);
        Self {
            concept_code,
            raw_label,
            normalized_label,
        }
    }
}

/// An ordered reference terminology.
///
/// Insertion order is the matching iteration order: fuzzy ties and duplicate
/// key collapse both resolve to the first entry encountered, which keeps
/// results reproducible across runs. Duplicate concept codes are data-quality
/// noise in the exports and collapse to the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    entries: Vec<ReferenceEntry>,
    seen_codes: HashSet<String>,
}

impl ReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; a duplicate concept code is dropped (first wins).
    pub fn push(&mut self, entry: ReferenceEntry) {
        if self.seen_codes.contains(&entry.concept_code) {
            debug!(code = %entry.concept_code, "duplicate concept code dropped");
            return;
        }
        self.seen_codes.insert(entry.concept_code.clone());
        self.entries.push(entry);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReferenceEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by concept code.
    pub fn by_code(&self, code: &str) -> Option<&ReferenceEntry> {
        self.entries.iter().find(|e| e.concept_code == code)
    }
}

impl FromIterator<ReferenceEntry> for ReferenceSet {
    fn from_iter<I: IntoIterator<Item = ReferenceEntry>>(iter: I) -> Self {
        let mut set = Self::new();
        for entry in iter {
            set.push(entry);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ReferenceSet {
    type Item = &'a ReferenceEntry;
    type IntoIter = std::slice::Iter<'a, ReferenceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
