//! Analyze command implementation - align two sequences, then call and classify variants

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use mutanalyzer_core::io::read_sequence;
use mutanalyzer_core::{spawn_analysis, AnalysisJob, AnalysisOutcome, AnalysisRequest};
use std::path::PathBuf;
use std::time::Duration;

use super::{load_reference, resolve_exons, write_report};
use crate::config::Config;
use crate::error::CliError;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn execute(
    config: &Config,
    reference: PathBuf,
    sample: PathBuf,
    exons: Option<PathBuf>,
    output: Option<PathBuf>,
    show_progress: bool,
) -> Result<()> {
    log::info!("Starting mutation analysis");
    log::info!("Reference: {}", reference.display());
    log::info!("Sample: {}", sample.display());

    let reference_input = load_reference(&reference)?;
    CliError::check_exists(&sample)?;
    let sample_sequence = read_sequence(&sample)?;
    log::info!("Sample: {} bp", sample_sequence.len());

    let exons = resolve_exons(exons.as_deref(), reference_input.annotated_exons)?;

    let request = AnalysisRequest {
        reference: reference_input.sequence,
        sample: sample_sequence,
        exons,
        config: config.analysis,
        pathogenicity: config.report.pathogenicity,
    };

    log::info!(
        "Aligning ({} mode, timeout {}s) with the {} genetic code",
        config.analysis.alignment.mode,
        config.analysis.alignment.timeout_secs,
        config.analysis.genetic_code
    );
    let job = spawn_analysis(request)?;
    let outcome = wait_for(job, show_progress)?;

    log::info!(
        "Alignment score {} over {} columns ({:.1}% identity)",
        outcome.alignment.score,
        outcome.alignment.pair.len(),
        outcome.alignment.identity() * 100.0
    );

    write_report(config, &outcome.session, Some(&outcome.alignment), output.as_ref())?;

    log::info!("Analysis completed successfully");
    Ok(())
}

/// Block on the background job, ticking a spinner while it runs.
fn wait_for(job: AnalysisJob, show_progress: bool) -> Result<AnalysisOutcome> {
    if !show_progress {
        return Ok(job.wait()?);
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message("Aligning sequences and classifying variants");

    loop {
        if let Some(result) = job.wait_timeout(POLL_INTERVAL) {
            pb.finish_and_clear();
            return Ok(result?);
        }
        pb.tick();
    }
}
