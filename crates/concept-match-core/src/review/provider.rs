//! The decision seam between the review loop and whoever answers it.

use crate::models::SourceRecord;

use super::Candidate;

/// A reviewer's verdict on one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Index into the presented candidate slate.
    Chosen(usize),
    /// None of the candidates fit.
    NoMatch,
}

/// Source of decisions. The CLI implements this over stdin; tests script it.
///
/// Implementations must return in-range indices; the console provider
/// re-prompts on invalid input rather than passing it through. An
/// out-of-range index is treated by the session as [`Decision::NoMatch`].
pub trait DecisionProvider {
    fn choose(&mut self, record: &SourceRecord, candidates: &[Candidate]) -> Decision;
}
