//! Fuzzy name matching against a reference terminology.
//!
//! Scores live on a 0-100 scale. Each source record is scored against every
//! reference entry, O(|source| x |reference|) per stage; the lists involved
//! are a few thousand rows, so no blocking index is needed. The scan is also
//! embarrassingly parallel over source records if that ever changes, as long
//! as candidate selection stays in reference order.

use strsim::normalized_levenshtein;

use crate::models::{MatchResult, MatchScore, ReferenceEntry, ReferenceSet, SourceRecord, StageId, StageOutcome};

/// Similarity policy for a fuzzy stage.
///
/// The HUM list and the CIEL dictionary differ in verbosity, so the cascade
/// pairs each with its own scorer and threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scorer {
    /// Plain edit-distance similarity of the whole label.
    TokenRatio,
    /// Order-insensitive: whitespace tokens are sorted before scoring, so
    /// `"sodium chloride"` and `"chloride sodium"` score 100.
    TokenSort,
}

impl Scorer {
    /// Similarity of two labels in `[0, 100]`.
    pub fn score(self, a: &str, b: &str) -> u8 {
        match self {
            Scorer::TokenRatio => ratio(a, b),
            Scorer::TokenSort => ratio(&sort_tokens(a), &sort_tokens(b)),
        }
    }
}

fn ratio(a: &str, b: &str) -> u8 {
    (normalized_levenshtein(a, b) * 100.0).round() as u8
}

fn sort_tokens(label: &str) -> String {
    let mut tokens: Vec<&str> = label.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// A reference entry with its similarity to some source label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedCandidate<'a> {
    pub entry: &'a ReferenceEntry,
    pub score: u8,
}

/// The single best-scoring entry for `label`, ties broken by reference
/// iteration order (first encountered wins).
pub fn best_candidate<'a>(
    label: &str,
    references: &'a ReferenceSet,
    scorer: Scorer,
) -> Option<RankedCandidate<'a>> {
    let mut best: Option<RankedCandidate<'a>> = None;
    for entry in references {
        let score = scorer.score(label, &entry.normalized_label);
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(RankedCandidate { entry, score });
        }
    }
    best
}

/// The top `limit` entries for `label`, ordered by score descending with
/// reference iteration order as the stable tie-break.
pub fn rank<'a>(
    label: &str,
    references: &'a ReferenceSet,
    scorer: Scorer,
    limit: usize,
) -> Vec<RankedCandidate<'a>> {
    let mut ranked: Vec<RankedCandidate<'a>> = references
        .iter()
        .map(|entry| RankedCandidate {
            entry,
            score: scorer.score(label, &entry.normalized_label),
        })
        .collect();
    // stable sort preserves reference order between equal scores
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(limit);
    ranked
}

/// Match each source record to its best-scoring reference entry, keeping
/// only matches **strictly above** `threshold`; everything else goes to the
/// remainder.
pub fn match_fuzzy(
    sources: Vec<SourceRecord>,
    references: &ReferenceSet,
    scorer: Scorer,
    threshold: u8,
    stage: StageId,
) -> StageOutcome {
    let mut outcome = StageOutcome::default();
    for source in sources {
        let best = best_candidate(&source.normalized_label, references, scorer);
        match best {
            Some(candidate) if candidate.score > threshold => {
                outcome.matches.push(MatchResult {
                    concept_code: candidate.entry.concept_code.clone(),
                    candidate_label: candidate.entry.normalized_label.clone(),
                    score: MatchScore::Auto(candidate.score),
                    stage,
                    source,
                });
            }
            _ => outcome.remainder.push(source),
        }
    }
    outcome
}
