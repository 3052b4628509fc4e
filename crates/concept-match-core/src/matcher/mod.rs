//! Matching primitives: label normalization, exact-key and fuzzy matching.
//!
//! All matchers are pure over their inputs and partition every input set
//! into `(matched, remainder)` with nothing lost and nothing duplicated.

mod exact;
mod fuzzy;
mod normalizer;

pub use exact::*;
pub use fuzzy::*;
pub use normalizer::*;
