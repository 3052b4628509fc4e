//! The cascading pipeline: stage orchestration and checkpointing.

mod cascade;
mod checkpoint;

pub use cascade::*;
pub use checkpoint::*;

use thiserror::Error;

/// Pipeline errors.
///
/// Only configuration-level problems surface here (an unwritable checkpoint
/// directory, a missing input file). Data-quality problems are handled with
/// logged fallbacks and never abort a run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] crate::io::IoError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
