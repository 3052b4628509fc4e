//! On-disk checkpoint store.
//!
//! Each stage persists its complete state as one CSV file named after the
//! stage tag, with a row tag (`match`, `todo`, `rejected`) as the first
//! field. Once a checkpoint exists it is authoritative: subsequent runs load
//! it instead of recomputing, and re-deriving a stage requires an operator
//! deleting its file.
//!
//! Saves replace the file through a temp file and a single `fs::rename`, so
//! readers only ever see the previous complete checkpoint or the new one,
//! never a mix. This matters most for the review stage, which rewrites its
//! checkpoint after every decision. A checkpoint that fails to parse in the
//! required shape is treated as absent; matching is idempotent, so
//! recomputing is the safe default.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::io::{self, IoError};
use crate::models::{MatchResult, SourceKind, SourceRecord, StageId, StageOutcome};

use super::PipelineResult;

const MATCH_TAG: &str = "match";
const TODO_TAG: &str = "todo";
const REJECTED_TAG: &str = "rejected";

/// Full persisted state of the review stage: decided matches, still-pending
/// records, and "none of these" rejections. All three live in one file so a
/// decision is committed to all of them atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewState {
    pub matches: Vec<MatchResult>,
    pub todo: Vec<SourceRecord>,
    pub rejected: Vec<SourceRecord>,
}

pub struct CheckpointStore {
    dir: PathBuf,
    kind: SourceKind,
}

impl CheckpointStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>, kind: SourceKind) -> PipelineResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| IoError::Write {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir, kind })
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    fn stage_path(&self, stage: StageId) -> PathBuf {
        self.dir.join(format!("{}.csv", stage.tag()))
    }

    /// Whether a checkpoint file exists for `stage`.
    pub fn exists(&self, stage: StageId) -> bool {
        self.stage_path(stage).exists()
    }

    /// Persist an automated stage's outcome.
    pub fn save(
        &self,
        stage: StageId,
        matches: &[MatchResult],
        remainder: &[SourceRecord],
    ) -> PipelineResult<()> {
        let rows = tagged_rows(matches, remainder, &[]);
        write_atomic(&rows, &self.stage_path(stage))?;
        Ok(())
    }

    /// Load an automated stage's checkpoint, or `None` if it is absent or
    /// unreadable. A `rejected` row in an automated stage's file means the
    /// file is not that stage's state, so the checkpoint is rejected whole.
    pub fn load(&self, stage: StageId) -> Option<StageOutcome> {
        let state = self.parse_stage(stage)?;
        if !state.rejected.is_empty() {
            warn!(stage = %stage, "unexpected rejected rows; treating checkpoint as absent");
            return None;
        }
        Some(StageOutcome {
            matches: state.matches,
            remainder: state.todo,
        })
    }

    /// Persist the review stage's full state in one atomic replace.
    pub fn save_review(
        &self,
        matches: &[MatchResult],
        todo: &[SourceRecord],
        rejected: &[SourceRecord],
    ) -> PipelineResult<()> {
        let rows = tagged_rows(matches, todo, rejected);
        write_atomic(&rows, &self.stage_path(StageId::Choice))?;
        Ok(())
    }

    /// Load the review stage's state. Any malformed row, including a
    /// rejected one, invalidates the whole checkpoint: a partial read could
    /// silently drop records from the final unmatched output.
    pub fn load_review(&self) -> Option<ReviewState> {
        self.parse_stage(StageId::Choice)
    }

    fn parse_stage(&self, stage: StageId) -> Option<ReviewState> {
        let rows = read_optional(&self.stage_path(stage))?;
        let mut state = ReviewState::default();
        for row in &rows {
            let (tag, rest) = row.split_first()?;
            let parsed = match tag.as_str() {
                MATCH_TAG => MatchResult::from_row(rest, self.kind, stage)
                    .map(|result| state.matches.push(result)),
                TODO_TAG => {
                    SourceRecord::from_row(rest, self.kind).map(|record| state.todo.push(record))
                }
                REJECTED_TAG => SourceRecord::from_row(rest, self.kind)
                    .map(|record| state.rejected.push(record)),
                _ => None,
            };
            if parsed.is_none() {
                warn!(stage = %stage, ?row, "malformed checkpoint row; treating checkpoint as absent");
                return None;
            }
        }
        Some(state)
    }
}

fn tagged_rows(
    matches: &[MatchResult],
    todo: &[SourceRecord],
    rejected: &[SourceRecord],
) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(matches.len() + todo.len() + rejected.len());
    rows.extend(matches.iter().map(|m| tag_row(MATCH_TAG, m.to_row())));
    rows.extend(todo.iter().map(|r| tag_row(TODO_TAG, r.to_row())));
    rows.extend(rejected.iter().map(|r| tag_row(REJECTED_TAG, r.to_row())));
    rows
}

fn tag_row(tag: &str, mut row: Vec<String>) -> Vec<String> {
    row.insert(0, tag.to_string());
    row
}

fn write_atomic(rows: &[Vec<String>], path: &Path) -> Result<(), IoError> {
    let tmp = path.with_extension("csv.tmp");
    io::write_rows(rows, &tmp)?;
    fs::rename(&tmp, path).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a checkpoint file; `None` for missing or unreadable files.
fn read_optional(path: &Path) -> Option<Vec<Vec<String>>> {
    match io::read_rows(path) {
        Ok(rows) => Some(rows),
        Err(IoError::FileNotFound { .. }) => None,
        Err(error) => {
            warn!(%error, "unreadable checkpoint file; treating as absent");
            None
        }
    }
}
