//! Exact-key matching on normalized labels.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::debug;

use crate::models::{MatchResult, MatchScore, ReferenceSet, SourceRecord, StageId, StageOutcome};

/// Match source records to reference entries by exact normalized key.
///
/// The key map is built in reference iteration order with the first
/// occurrence winning on duplicate keys, so output is deterministic even on
/// dirty reference exports. Matching is keyed purely on the normalized
/// label; records with an empty or unknown `id` are fully eligible.
pub fn match_exact(
    sources: Vec<SourceRecord>,
    references: &ReferenceSet,
    stage: StageId,
) -> StageOutcome {
    let mut key_to_entry = HashMap::new();
    for entry in references {
        match key_to_entry.entry(entry.normalized_label.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
            Entry::Occupied(_) => debug!(
                key = %entry.normalized_label,
                dropped = %entry.concept_code,
                "duplicate reference key collapsed"
            ),
        }
    }

    let mut outcome = StageOutcome::default();
    for source in sources {
        match key_to_entry.get(source.normalized_label.as_str()) {
            Some(entry) => outcome.matches.push(MatchResult {
                concept_code: entry.concept_code.clone(),
                candidate_label: entry.normalized_label.clone(),
                score: MatchScore::Auto(100),
                stage,
                source,
            }),
            None => outcome.remainder.push(source),
        }
    }
    outcome
}
