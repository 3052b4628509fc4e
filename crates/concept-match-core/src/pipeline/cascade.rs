//! Cascade controller.
//!
//! Runs the configured stage sequence, feeding each stage the unmatched
//! remainder of the previous one. A stage whose checkpoint already exists is
//! skipped and its persisted outcome adopted as if just computed, which makes
//! re-running after an interruption idempotent.

use tracing::info;

use crate::matcher::{match_exact, match_fuzzy, Scorer};
use crate::models::{MatchResult, ReferenceSet, SourceKind, SourceRecord, StageId, StageOutcome};
use crate::review::{DecisionProvider, ReviewLimits, ReviewSession};

use super::{CheckpointStore, PipelineResult};

/// Score a candidate must strictly exceed to auto-match against HUM.
pub const HUM_MATCH_SCORE_LIMIT: u8 = 80;
/// Score a candidate must strictly exceed to auto-match against CIEL. Lower
/// than HUM because CIEL display names are terser.
pub const CIEL_MATCH_SCORE_LIMIT: u8 = 70;

/// Explicit run configuration; there is no global mode state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub kind: SourceKind,
    pub hum_threshold: u8,
    pub ciel_threshold: u8,
    pub limits: ReviewLimits,
}

impl PipelineConfig {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            hum_threshold: HUM_MATCH_SCORE_LIMIT,
            ciel_threshold: CIEL_MATCH_SCORE_LIMIT,
            limits: ReviewLimits::default(),
        }
    }
}

/// Accumulated result of a full cascade run.
#[derive(Debug, Clone, Default)]
pub struct CascadeOutcome {
    /// Every stage's matches, in stage order.
    pub matched: Vec<MatchResult>,
    /// The final stage's remainder: records nothing resolved.
    pub unmatched: Vec<SourceRecord>,
    /// Per-stage match counts, in stage order.
    pub stage_counts: Vec<(StageId, usize)>,
}

pub struct Cascade<'a> {
    config: PipelineConfig,
    store: &'a CheckpointStore,
}

impl<'a> Cascade<'a> {
    pub fn new(config: PipelineConfig, store: &'a CheckpointStore) -> Self {
        Self { config, store }
    }

    /// Diagnosis cascade: three exact-code stages of decreasing authority.
    pub fn run_diagnosis(
        &self,
        sources: Vec<SourceRecord>,
        pih: &ReferenceSet,
        ciel: &ReferenceSet,
        who: &ReferenceSet,
    ) -> PipelineResult<CascadeOutcome> {
        let mut outcome = CascadeOutcome::default();

        let remainder = self.run_stage(StageId::ExactPih, sources, &mut outcome, |input| {
            match_exact(input, pih, StageId::ExactPih)
        })?;
        let remainder = self.run_stage(StageId::ExactCiel, remainder, &mut outcome, |input| {
            match_exact(input, ciel, StageId::ExactCiel)
        })?;
        let remainder = self.run_stage(StageId::ExactWho, remainder, &mut outcome, |input| {
            match_exact(input, who, StageId::ExactWho)
        })?;

        outcome.unmatched = remainder;
        Ok(outcome)
    }

    /// Medication cascade: two fuzzy stages, then manual review of whatever
    /// is left.
    pub fn run_medication(
        &self,
        sources: Vec<SourceRecord>,
        hum: &ReferenceSet,
        ciel: &ReferenceSet,
        provider: &mut dyn DecisionProvider,
    ) -> PipelineResult<CascadeOutcome> {
        let mut outcome = CascadeOutcome::default();

        let hum_threshold = self.config.hum_threshold;
        let remainder = self.run_stage(StageId::FuzzyHum, sources, &mut outcome, |input| {
            match_fuzzy(input, hum, Scorer::TokenRatio, hum_threshold, StageId::FuzzyHum)
        })?;

        let ciel_threshold = self.config.ciel_threshold;
        let remainder = self.run_stage(StageId::FuzzyCiel, remainder, &mut outcome, |input| {
            match_fuzzy(
                input,
                ciel,
                Scorer::TokenSort,
                ciel_threshold,
                StageId::FuzzyCiel,
            )
        })?;

        // The review session does its own finer-grained checkpointing
        // (after every decision), so it is not wrapped in run_stage.
        info!(left = remainder.len(), "entering manual review");
        let session = ReviewSession::new(hum, ciel, self.config.limits);
        let reviewed = session.run(remainder, self.store, provider)?;
        outcome
            .stage_counts
            .push((StageId::Choice, reviewed.matches.len()));
        outcome.matched.extend(reviewed.matches);
        outcome.unmatched = reviewed.remainder;
        Ok(outcome)
    }

    /// Run one stage, unless its checkpoint already exists; either way,
    /// absorb its matches into `outcome` and hand the remainder forward.
    fn run_stage<F>(
        &self,
        stage: StageId,
        input: Vec<SourceRecord>,
        outcome: &mut CascadeOutcome,
        matcher: F,
    ) -> PipelineResult<Vec<SourceRecord>>
    where
        F: FnOnce(Vec<SourceRecord>) -> StageOutcome,
    {
        let stage_outcome = match self.store.load(stage) {
            Some(existing) => {
                info!(
                    stage = %stage,
                    matched = existing.matches.len(),
                    unmatched = existing.remainder.len(),
                    "checkpoint found; skipping computation"
                );
                existing
            }
            None => {
                info!(stage = %stage, input = input.len(), "running {}", stage.describe());
                let computed = matcher(input);
                self.store
                    .save(stage, &computed.matches, &computed.remainder)?;
                info!(
                    stage = %stage,
                    matched = computed.matches.len(),
                    unmatched = computed.remainder.len(),
                    "stage complete"
                );
                computed
            }
        };

        outcome
            .stage_counts
            .push((stage, stage_outcome.matches.len()));
        outcome.matched.extend(stage_outcome.matches);
        Ok(stage_outcome.remainder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::LabelRule;
    use crate::models::ReferenceEntry;

    fn diag(id: &str, code: &str, name: &str) -> SourceRecord {
        SourceRecord::new(
            id.into(),
            code.into(),
            vec![name.into()],
            SourceKind::Diagnosis,
        )
    }

    fn refs(entries: &[(&str, &str)]) -> ReferenceSet {
        entries
            .iter()
            .map(|(code, label)| {
                ReferenceEntry::new((*code).into(), (*label).into(), LabelRule::Verbatim)
            })
            .collect()
    }

    #[test]
    fn test_diagnosis_cascade_partitions_input() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("cp"), SourceKind::Diagnosis).unwrap();
        let cascade = Cascade::new(PipelineConfig::new(SourceKind::Diagnosis), &store);

        let sources = vec![
            diag("1", "K730", "Hepatitis"),
            diag("2", "B99", "Infeccion"),
            diag("3", "Z999", "Sin mapa"),
        ];
        let pih = refs(&[("pih-1", "K73.0")]);
        let ciel = refs(&[("ciel-1", "B99")]);
        let who = refs(&[]);

        let outcome = cascade
            .run_diagnosis(sources.clone(), &pih, &ciel, &who)
            .unwrap();

        assert_eq!(outcome.matched.len(), 2);
        assert_eq!(outcome.unmatched.len(), 1);
        assert_eq!(outcome.matched.len() + outcome.unmatched.len(), sources.len());
        assert_eq!(
            outcome.stage_counts,
            vec![
                (StageId::ExactPih, 1),
                (StageId::ExactCiel, 1),
                (StageId::ExactWho, 0)
            ]
        );
        assert_eq!(outcome.matched[0].stage, StageId::ExactPih);
        assert_eq!(outcome.matched[1].stage, StageId::ExactCiel);
    }

    #[test]
    fn test_existing_checkpoint_is_authoritative() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("cp"), SourceKind::Diagnosis).unwrap();
        let cascade = Cascade::new(PipelineConfig::new(SourceKind::Diagnosis), &store);

        let sources = vec![diag("1", "K730", "Hepatitis")];
        let pih = refs(&[("pih-1", "K73.0")]);
        let empty = refs(&[]);

        let first = cascade
            .run_diagnosis(sources.clone(), &pih, &empty, &empty)
            .unwrap();

        // second run with a reference set that would now miss: checkpoints win
        let second = cascade
            .run_diagnosis(sources, &refs(&[]), &empty, &empty)
            .unwrap();

        assert_eq!(first.matched, second.matched);
        assert_eq!(first.unmatched, second.unmatched);
    }
}
