//! Human-in-the-loop review of records no automated stage resolved.
//!
//! Each pending record gets a slate of top candidates drawn from both drug
//! references, and a decision provider (a person at a terminal, or a script
//! in tests) picks one or rejects them all. State is checkpointed after
//! every single decision, so killing the session loses at most the answer
//! being typed, never a committed one.

mod provider;

pub use provider::*;

use tracing::{info, warn};

use crate::matcher::{best_candidate, rank, Scorer};
use crate::models::{MatchResult, MatchScore, ReferenceSet, SourceRecord, StageId, StageOutcome};
use crate::pipeline::{CheckpointStore, PipelineResult};

/// How many candidates each reference contributes to a slate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewLimits {
    /// Top-N from the HUM drug list.
    pub hum: usize,
    /// Top-N from the CIEL dictionary (plus one token-sort best-of).
    pub ciel: usize,
}

impl Default for ReviewLimits {
    fn default() -> Self {
        Self { hum: 2, ciel: 6 }
    }
}

/// Which block of the slate a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOrigin {
    /// Top HUM candidates, plain similarity.
    Hum,
    /// Single best CIEL candidate under the token-sort scorer.
    CielBest,
    /// Top CIEL candidates, plain similarity.
    Ciel,
}

/// One option presented to the reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub concept_code: String,
    /// Normalized label, the form the reviewer compares against.
    pub label: String,
    /// The uncleaned reference label, shown for context.
    pub full_label: String,
    pub score: u8,
    pub origin: CandidateOrigin,
}

/// A resumable review pass over the cascade's final remainder.
pub struct ReviewSession<'a> {
    hum: &'a ReferenceSet,
    ciel: &'a ReferenceSet,
    limits: ReviewLimits,
}

impl<'a> ReviewSession<'a> {
    pub fn new(hum: &'a ReferenceSet, ciel: &'a ReferenceSet, limits: ReviewLimits) -> Self {
        Self { hum, ciel, limits }
    }

    /// Assemble the candidate slate for one record: top HUM matches, the
    /// token-sort best from CIEL, then top CIEL matches, in that fixed order.
    pub fn candidates(&self, record: &SourceRecord) -> Vec<Candidate> {
        let label = &record.normalized_label;
        let mut slate = Vec::with_capacity(self.limits.hum + self.limits.ciel + 1);

        for ranked in rank(label, self.hum, Scorer::TokenRatio, self.limits.hum) {
            slate.push(Candidate {
                concept_code: ranked.entry.concept_code.clone(),
                label: ranked.entry.normalized_label.clone(),
                full_label: ranked.entry.raw_label.clone(),
                score: ranked.score,
                origin: CandidateOrigin::Hum,
            });
        }

        if let Some(best) = best_candidate(label, self.ciel, Scorer::TokenSort) {
            slate.push(Candidate {
                concept_code: best.entry.concept_code.clone(),
                label: best.entry.normalized_label.clone(),
                full_label: best.entry.raw_label.clone(),
                score: best.score,
                origin: CandidateOrigin::CielBest,
            });
        }

        for ranked in rank(label, self.ciel, Scorer::TokenRatio, self.limits.ciel) {
            slate.push(Candidate {
                concept_code: ranked.entry.concept_code.clone(),
                label: ranked.entry.normalized_label.clone(),
                full_label: ranked.entry.raw_label.clone(),
                score: ranked.score,
                origin: CandidateOrigin::Ciel,
            });
        }

        slate
    }

    /// Work through the pending records, persisting after every decision.
    ///
    /// If a review checkpoint exists, its todo list supersedes `inherited`
    /// and its matches and rejections are carried forward, so an interrupted
    /// session picks up at the first undecided record. Each decision is
    /// committed through a single checkpoint replace, so every record stays
    /// in exactly one of matches, todo, or rejected at all times.
    pub fn run(
        &self,
        inherited: Vec<SourceRecord>,
        store: &CheckpointStore,
        provider: &mut dyn DecisionProvider,
    ) -> PipelineResult<StageOutcome> {
        let (mut matched, todo, mut rejected) = match store.load_review() {
            Some(existing) => {
                info!(
                    decided = existing.matches.len(),
                    rejected = existing.rejected.len(),
                    left = existing.todo.len(),
                    "found review work-in-progress; resuming"
                );
                (existing.matches, existing.todo, existing.rejected)
            }
            None => (Vec::new(), inherited, Vec::new()),
        };

        for (index, record) in todo.iter().enumerate() {
            let slate = self.candidates(record);
            match provider.choose(record, &slate) {
                Decision::Chosen(choice) if choice < slate.len() => {
                    let candidate = &slate[choice];
                    info!(
                        source = %record.raw_label,
                        code = %candidate.concept_code,
                        label = %candidate.label,
                        "reviewer chose candidate"
                    );
                    matched.push(MatchResult {
                        source: record.clone(),
                        concept_code: candidate.concept_code.clone(),
                        candidate_label: candidate.label.clone(),
                        score: MatchScore::Manual,
                        stage: StageId::Choice,
                    });
                }
                Decision::Chosen(out_of_range) => {
                    warn!(
                        choice = out_of_range,
                        slate = slate.len(),
                        "provider returned out-of-range choice; recording no match"
                    );
                    rejected.push(record.clone());
                }
                Decision::NoMatch => {
                    info!(source = %record.raw_label, "reviewer rejected all candidates");
                    rejected.push(record.clone());
                }
            }
            store.save_review(&matched, &todo[index + 1..], &rejected)?;
        }

        Ok(StageOutcome {
            matches: matched,
            remainder: rejected,
        })
    }
}
