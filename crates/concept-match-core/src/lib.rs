//! Concept-Match Core Library
//!
//! Maps entries from national diagnosis and medication lists (SSA/CES) to
//! concept codes in the PIH and CIEL reference terminologies, with a WHO/OCL
//! ICD cross-reference as a final diagnosis fallback.
//!
//! # Architecture
//!
//! ```text
//! Source rows → Normalizer → Stage 1 ─unmatched→ Stage 2 ─unmatched→ Stage 3
//!                               │                   │                   │
//!                            matched             matched             matched
//!                               └─────────┬─────────┴─────────┬─────────┘
//!                                         │  checkpoint per stage
//!                                         ▼
//!                              final matched + unmatched
//!
//! Diagnosis cascade:   Exact vs PIH  → Exact vs CIEL → Exact vs WHO xref
//! Medication cascade:  Fuzzy vs HUM  → Fuzzy vs CIEL → Manual review
//! ```
//!
//! Every stage consumes only the unmatched remainder of the previous stage
//! and persists its `(matched, remainder)` pair before the next stage runs,
//! so an interrupted run resumes where it left off. The manual review stage
//! checkpoints after every single decision.
//!
//! # Modules
//!
//! - [`models`]: Domain types (SourceRecord, ReferenceEntry, MatchResult, etc.)
//! - [`matcher`]: Name normalization, exact-key and fuzzy matching
//! - [`pipeline`]: Cascade controller and checkpoint store
//! - [`review`]: Human-in-the-loop adjudication of leftover records
//! - [`io`]: CSV/JSON loading and the national files' column layouts

pub mod io;
pub mod matcher;
pub mod models;
pub mod pipeline;
pub mod review;

// Re-export commonly used types
pub use matcher::{normalize, LabelRule, Scorer};
pub use models::{
    MatchResult, MatchScore, ReferenceEntry, ReferenceSet, SourceKind, SourceRecord, StageId,
    StageOutcome,
};
pub use pipeline::{Cascade, CascadeOutcome, CheckpointStore, PipelineConfig, PipelineResult};
pub use review::{Candidate, Decision, DecisionProvider, ReviewLimits, ReviewSession};
