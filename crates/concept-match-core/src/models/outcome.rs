//! Match results and per-stage outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{SourceKind, SourceRecord};

/// One matching pass of a cascade. The tag is stable; checkpoint file names
/// are derived from it, so renaming a variant orphans existing checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageId {
    /// Exact ICD-code match against PIH concepts.
    ExactPih,
    /// Exact ICD-code match against CIEL concepts.
    ExactCiel,
    /// Exact ICD-code match against the WHO/OCL cross-reference.
    ExactWho,
    /// Fuzzy name match against the HUM drug list.
    FuzzyHum,
    /// Fuzzy name match against the CIEL dictionary.
    FuzzyCiel,
    /// Human-adjudicated choice among top candidates.
    Choice,
}

impl StageId {
    /// Stable file-name tag.
    pub fn tag(self) -> &'static str {
        match self {
            StageId::ExactPih => "exact-pih",
            StageId::ExactCiel => "exact-ciel",
            StageId::ExactWho => "exact-who",
            StageId::FuzzyHum => "fuzzy-hum",
            StageId::FuzzyCiel => "fuzzy-ciel",
            StageId::Choice => "choice",
        }
    }

    /// Human-readable description for logs.
    pub fn describe(self) -> &'static str {
        match self {
            StageId::ExactPih => "exact match vs PIH concepts",
            StageId::ExactCiel => "exact match vs CIEL concepts",
            StageId::ExactWho => "exact match vs WHO ICD cross-reference",
            StageId::FuzzyHum => "fuzzy match vs HUM drug list",
            StageId::FuzzyCiel => "fuzzy match vs CIEL dictionary",
            StageId::Choice => "manual review",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// How confident a match is. Automated stages carry a 0-100 similarity
/// score; human decisions carry the `Manual` sentinel (serialized as `-`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchScore {
    Auto(u8),
    Manual,
}

impl MatchScore {
    /// Parse the persisted form; `None` for anything malformed.
    pub fn parse(text: &str) -> Option<Self> {
        if text == "-" {
            return Some(MatchScore::Manual);
        }
        let value: u8 = text.parse().ok()?;
        if value > 100 {
            return None;
        }
        Some(MatchScore::Auto(value))
    }
}

impl fmt::Display for MatchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchScore::Auto(score) => write!(f, "{}", score),
            MatchScore::Manual => f.write_str("-"),
        }
    }
}

/// A source record resolved to a reference concept. Immutable once created;
/// results are only ever appended to the cumulative matched set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchResult {
    pub source: SourceRecord,
    pub concept_code: String,
    /// The reference label the match was made against (normalized form).
    pub candidate_label: String,
    pub score: MatchScore,
    pub stage: StageId,
}

impl MatchResult {
    /// Flatten to the persisted row shape:
    /// `[id, raw_label, attributes.., concept_code, candidate_label, score]`.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = self.source.to_row();
        row.push(self.concept_code.clone());
        row.push(self.candidate_label.clone());
        row.push(self.score.to_string());
        row
    }

    /// Rebuild from a persisted row for the given stage.
    pub fn from_row(row: &[String], kind: SourceKind, stage: StageId) -> Option<Self> {
        if row.len() < 5 {
            return None;
        }
        let split = row.len() - 3;
        let source = SourceRecord::from_row(&row[..split], kind)?;
        let score = MatchScore::parse(&row[split + 2])?;
        Some(Self {
            source,
            concept_code: row[split].clone(),
            candidate_label: row[split + 1].clone(),
            score,
            stage,
        })
    }
}

/// What a stage produced: the matched results plus the records the next
/// stage inherits. Together they partition the stage's input exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageOutcome {
    pub matches: Vec<MatchResult>,
    pub remainder: Vec<SourceRecord>,
}
