//! Concept-match command-line entry point.
//!
//! Loads the inputs for the selected mode, runs the cascade against its
//! checkpoint directory, and writes the final matched and unmatched files.
//! Missing reference files are fatal before any stage runs.

mod cli;
mod console;

use std::fs;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use concept_match_core::io as core_io;
use concept_match_core::{
    Cascade, CascadeOutcome, CheckpointStore, MatchResult, PipelineConfig, SourceKind,
    SourceRecord,
};

use cli::{Cli, Mode};
use console::ConsoleProvider;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    if let Err(err) = run(&cli) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let kind = cli.mode.kind();
    let store = CheckpointStore::new(cli.checkpoint_dir.join(kind.tag()), kind)
        .context("opening checkpoint store")?;

    let mut config = PipelineConfig::new(kind);
    if let Some(threshold) = cli.hum_threshold {
        config.hum_threshold = threshold;
    }
    if let Some(threshold) = cli.ciel_threshold {
        config.ciel_threshold = threshold;
    }
    let cascade = Cascade::new(config, &store);

    let outcome = match cli.mode {
        Mode::Diagnosis => run_diagnosis(cli, &cascade)?,
        Mode::Ssa => {
            let sources = core_io::ssa_medications(&cli.input_dir.join("meds-ssa.csv"))
                .context("loading SSA medication list")?;
            run_medication(cli, &cascade, sources)?
        }
        Mode::Ces => {
            let sources = core_io::ces_medications(&cli.input_dir.join("meds-ces.csv"))
                .context("loading CES medication list")?;
            run_medication(cli, &cascade, sources)?
        }
    };

    write_outputs(cli, kind, &outcome)
}

fn run_diagnosis(cli: &Cli, cascade: &Cascade<'_>) -> anyhow::Result<CascadeOutcome> {
    let dir = cli.input_dir.join("diagnoses");
    let sources = core_io::ssa_diagnoses(&dir.join("ssa-diagnoses.csv"))
        .context("loading SSA diagnosis list")?;
    let pih = core_io::concept_diagnoses(&dir.join("pih-diagnoses.csv"))
        .context("loading PIH diagnosis concepts")?;
    let ciel = core_io::concept_diagnoses(&dir.join("ciel-diagnoses.csv"))
        .context("loading CIEL diagnosis concepts")?;
    let who = core_io::who_crossref(&dir.join("who-diagnoses.json"))
        .context("loading WHO/OCL cross-reference")?;
    info!(
        sources = sources.len(),
        pih = pih.len(),
        ciel = ciel.len(),
        who = who.len(),
        "diagnosis inputs loaded"
    );

    Ok(cascade.run_diagnosis(sources, &pih, &ciel, &who)?)
}

fn run_medication(
    cli: &Cli,
    cascade: &Cascade<'_>,
    sources: Vec<SourceRecord>,
) -> anyhow::Result<CascadeOutcome> {
    let hum = core_io::hum_catalog(&cli.input_dir.join("HUM_Drug_List.csv"))
        .context("loading HUM drug list")?;
    let ciel = core_io::ciel_dictionary(&cli.input_dir.join("meds-ciel.json"))
        .context("loading CIEL dictionary")?;
    info!(
        sources = sources.len(),
        hum = hum.len(),
        ciel = ciel.len(),
        "medication inputs loaded"
    );

    let mut provider = ConsoleProvider;
    Ok(cascade.run_medication(sources, &hum, &ciel, &mut provider)?)
}

fn write_outputs(cli: &Cli, kind: SourceKind, outcome: &CascadeOutcome) -> anyhow::Result<()> {
    fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating {}", cli.output_dir.display()))?;

    let matches_path = cli.output_dir.join(format!("{}-matches.csv", kind.tag()));
    let unmatched_path = cli.output_dir.join(format!("{}-unmatched.csv", kind.tag()));

    let match_rows: Vec<Vec<String>> = outcome.matched.iter().map(MatchResult::to_row).collect();
    let unmatched_rows: Vec<Vec<String>> =
        outcome.unmatched.iter().map(SourceRecord::to_row).collect();
    core_io::write_rows(&match_rows, &matches_path).context("writing matches file")?;
    core_io::write_rows(&unmatched_rows, &unmatched_path).context("writing unmatched file")?;

    for (stage, count) in &outcome.stage_counts {
        info!(stage = %stage, matched = count, "stage summary");
    }
    info!(
        matched = outcome.matched.len(),
        unmatched = outcome.unmatched.len(),
        matches_file = %matches_path.display(),
        unmatched_file = %unmatched_path.display(),
        "run complete"
    );
    Ok(())
}
