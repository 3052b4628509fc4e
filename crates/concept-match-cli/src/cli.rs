//! Argument definitions.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use concept_match_core::SourceKind;

#[derive(Debug, Parser)]
#[command(
    name = "concept-match",
    version,
    about = "Map national diagnosis and medication lists to reference terminology concepts"
)]
pub struct Cli {
    /// Which source list to reconcile.
    #[arg(value_enum)]
    pub mode: Mode,

    /// Directory holding the source lists and terminology exports.
    #[arg(long, default_value = "input")]
    pub input_dir: PathBuf,

    /// Directory the final matched and unmatched files are written to.
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Directory for per-stage checkpoints. Deleting a stage's files there
    /// forces that stage to recompute on the next run.
    #[arg(long, default_value = "intermediates")]
    pub checkpoint_dir: PathBuf,

    /// Auto-match threshold for the HUM stage; matches must score strictly
    /// above it.
    #[arg(long, value_name = "SCORE")]
    pub hum_threshold: Option<u8>,

    /// Auto-match threshold for the CIEL stage.
    #[arg(long, value_name = "SCORE")]
    pub ciel_threshold: Option<u8>,

    /// Enable debug-level logging (RUST_LOG still takes precedence).
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// SSA diagnoses against PIH, CIEL, then the WHO cross-reference.
    Diagnosis,
    /// SSA medications against HUM, CIEL, then manual review.
    Ssa,
    /// CES medications against HUM, CIEL, then manual review.
    Ces,
}

impl Mode {
    pub fn kind(self) -> SourceKind {
        match self {
            Mode::Diagnosis => SourceKind::Diagnosis,
            Mode::Ssa => SourceKind::SsaMedication,
            Mode::Ces => SourceKind::CesMedication,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["concept-match", "ssa"]);
        assert_eq!(cli.mode, Mode::Ssa);
        assert_eq!(cli.input_dir, PathBuf::from("input"));
        assert_eq!(cli.output_dir, PathBuf::from("output"));
        assert_eq!(cli.checkpoint_dir, PathBuf::from("intermediates"));
        assert_eq!(cli.hum_threshold, None);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_threshold_overrides() {
        let cli = Cli::parse_from(["concept-match", "ces", "--hum-threshold", "90"]);
        assert_eq!(cli.hum_threshold, Some(90));
        assert_eq!(cli.ciel_threshold, None);
    }

    #[test]
    fn test_mode_kind_mapping() {
        assert_eq!(Mode::Diagnosis.kind(), SourceKind::Diagnosis);
        assert_eq!(Mode::Ssa.kind(), SourceKind::SsaMedication);
        assert_eq!(Mode::Ces.kind(), SourceKind::CesMedication);
    }
}
