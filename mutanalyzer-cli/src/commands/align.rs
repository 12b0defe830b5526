//! Align command implementation - print the pairwise alignment of two sequences

use anyhow::{Context, Result};
use mutanalyzer_core::io::read_sequence;
use mutanalyzer_core::{PairwiseAligner, SequenceAligner};
use std::io::Write;
use std::path::PathBuf;

use super::{load_reference, open_output};
use crate::config::Config;
use crate::error::CliError;

pub fn execute(
    config: &Config,
    reference: PathBuf,
    sample: PathBuf,
    output: Option<PathBuf>,
) -> Result<()> {
    let reference_input = load_reference(&reference)?;
    CliError::check_exists(&sample)?;
    let sample_sequence = read_sequence(&sample)?;

    let aligner = PairwiseAligner::new(config.analysis.alignment);
    log::info!("Aligning with {} ({} mode)", aligner.name(), aligner.config().mode);
    let alignment = aligner.align(&reference_input.sequence, &sample_sequence)?;

    let mut out = open_output(output.as_ref())?;
    writeln!(
        out,
        "# {} alignment, score {}, {} columns, {:.2}% identity",
        alignment.mode,
        alignment.score,
        alignment.pair.len(),
        alignment.identity() * 100.0
    )?;
    writeln!(out)?;
    write!(out, "{}", alignment.format_alignment(config.report.width))?;
    out.flush().context("Failed to write alignment")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_align_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("ref.fa");
        let sample = dir.path().join("sample.fa");
        let output = dir.path().join("aln.txt");
        fs::write(&reference, ">ref\nATGGCCAAA\n").unwrap();
        fs::write(&sample, ">sample\nATGGTCAAA\n").unwrap();

        execute(&Config::default(), reference, sample, Some(output.clone())).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("# global alignment, score 7, 9 columns"));
        assert!(text.contains("Reference"));
        assert!(text.contains("||||.||||"));
    }
}
