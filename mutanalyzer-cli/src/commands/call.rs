//! Call command implementation - classify variants in a pre-aligned pair

use anyhow::{Context, Result};
use mutanalyzer_core::io::read_aligned_pair;
use mutanalyzer_core::{AnalysisSession, RegionIndex};
use std::path::PathBuf;

use super::{resolve_exons, write_report};
use crate::config::Config;
use crate::error::CliError;

pub fn execute(
    config: &Config,
    aligned: PathBuf,
    exons: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    log::info!("Calling variants from pre-aligned input: {}", aligned.display());

    CliError::check_exists(&aligned)?;
    let pair = read_aligned_pair(&aligned)
        .with_context(|| format!("Failed to read aligned pair: {}", aligned.display()))?;
    log::info!(
        "Aligned pair: {} columns ({} bp reference, {} bp sample)",
        pair.len(),
        pair.reference_length(),
        pair.sample_length()
    );

    let regions = RegionIndex::build(resolve_exons(exons.as_deref(), Vec::new())?);
    let mut session = AnalysisSession::run(pair, regions, &config.analysis)?;
    if config.report.pathogenicity {
        session = session.with_pathogenicity();
    }

    write_report(config, &session, None, output.as_ref())?;

    log::info!("Variant calling completed successfully");
    Ok(())
}
