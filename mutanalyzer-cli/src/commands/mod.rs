//! Command implementations for the MutAnalyzer CLI

pub mod align;
pub mod analyze;
pub mod call;
pub mod config;

use anyhow::{Context, Result};
use mutanalyzer_core::io::{is_genbank_file, read_exon_ranges, read_genbank, read_sequence};
use mutanalyzer_core::sequence::normalize_sequence;
use mutanalyzer_core::{AnalysisSession, GenomicRange, PairwiseAlignment};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{Config, ReportFormat};
use crate::error::CliError;
use crate::report::Report;

/// Reference sequence plus any exons annotated in the same file.
#[derive(Debug)]
pub struct ReferenceInput {
    pub sequence: Vec<u8>,
    pub annotated_exons: Vec<GenomicRange>,
}

/// Read a reference from FASTA/FASTQ/plain text, or from a GenBank record
/// whose exon (or CDS) features become the default exon set.
pub fn load_reference(path: &Path) -> Result<ReferenceInput> {
    CliError::check_exists(path)?;

    if is_genbank_file(path)? {
        let record = read_genbank(path)
            .with_context(|| format!("Failed to read GenBank record: {}", path.display()))?;
        let annotated_exons = record.coding_ranges();
        log::info!(
            "Reference '{}' from GenBank: {} bp, {} annotated exons",
            record.name,
            record.sequence.len(),
            annotated_exons.len()
        );
        let sequence = normalize_sequence(&record.sequence)
            .with_context(|| format!("Invalid sequence in {}", path.display()))?;
        return Ok(ReferenceInput {
            sequence,
            annotated_exons,
        });
    }

    let sequence = read_sequence(path)?;
    log::info!("Reference: {} bp from {}", sequence.len(), path.display());
    Ok(ReferenceInput {
        sequence,
        annotated_exons: Vec::new(),
    })
}

/// Exons from `--exons` if given, otherwise `fallback`.
pub fn resolve_exons(exons: Option<&Path>, fallback: Vec<GenomicRange>) -> Result<Vec<GenomicRange>> {
    let ranges = match exons {
        Some(path) => {
            CliError::check_exists(path)?;
            read_exon_ranges(path)?
        }
        None => fallback,
    };

    if ranges.is_empty() {
        log::warn!("No exon coordinates supplied; every variant will be reported as intergenic");
    }
    Ok(ranges)
}

/// Render a finished session to `output` (or stdout) in the configured format.
pub fn write_report(
    config: &Config,
    session: &AnalysisSession,
    alignment: Option<&PairwiseAlignment>,
    output: Option<&PathBuf>,
) -> Result<()> {
    let mut report = Report::new(session)
        .with_width(config.report.width)
        .with_protein_comparison(config.report.protein_comparison);
    if let Some(alignment) = alignment {
        report = report.with_alignment(alignment);
    }

    let mut out = open_output(output)?;
    match config.report.format {
        ReportFormat::Text => report.write_text(&mut out),
        ReportFormat::Json => report.write_json(&mut out),
    }
    .context("Failed to write report")?;
    out.flush().context("Failed to write report")?;

    if let Some(path) = output {
        log::info!("Report written to: {}", path.display());
    }
    Ok(())
}

pub fn open_output(output: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const GENBANK: &str = "\
LOCUS       TESTGENE                  12 bp    DNA     linear   PRI 01-JAN-2024
DEFINITION  Test gene.
ACCESSION   TESTGENE
VERSION     TESTGENE.1
FEATURES             Location/Qualifiers
     exon            1..6
     exon            10..12
ORIGIN
        1 atggccaaat tt
//
";

    #[test]
    fn test_genbank_reference_supplies_exons() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gene.gb");
        fs::write(&path, GENBANK).unwrap();

        let input = load_reference(&path).unwrap();
        assert_eq!(input.sequence, b"ATGGCCAAATTT".to_vec());
        assert_eq!(input.annotated_exons.len(), 2);

        let exons = resolve_exons(None, input.annotated_exons).unwrap();
        assert_eq!(exons[1], GenomicRange::new(10, 12).unwrap());
    }

    #[test]
    fn test_gzipped_genbank_reference_supplies_exons() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gene.gb.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(GENBANK.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let input = load_reference(&path).unwrap();
        assert_eq!(input.sequence, b"ATGGCCAAATTT".to_vec());
        assert_eq!(
            input.annotated_exons,
            vec![GenomicRange::new(1, 6).unwrap(), GenomicRange::new(10, 12).unwrap()]
        );
    }

    #[test]
    fn test_exon_file_overrides_annotation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exons.txt");
        fs::write(&path, "# start end\n2 5\n").unwrap();

        let fallback = vec![GenomicRange::new(1, 12).unwrap()];
        let exons = resolve_exons(Some(&path), fallback).unwrap();
        assert_eq!(exons, vec![GenomicRange::new(2, 5).unwrap()]);
    }

    #[test]
    fn test_missing_reference() {
        let err = load_reference(Path::new("/nonexistent/ref.fa")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::FileNotFound { .. })
        ));
    }
}
