//! Exon coordinate input
//!
//! Three layouts are recognised by content:
//!
//! - GenBank flat files (first line starts with `LOCUS`)
//! - GFF3, any line with nine tab-separated columns
//! - a plain list with one `start end` pair per line, separated by
//!   whitespace, a comma or a dash
//!
//! GenBank and GFF3 use `exon` features, falling back to `CDS` features
//! when no exon is annotated. All coordinates are 1-based inclusive.

use std::io::Read;
use std::path::Path;

use super::fasta::open_input;
use super::genbank;
use crate::error::{AnalysisError, AnalysisResult};
use crate::types::GenomicRange;

/// Read exon ranges from `path` in any supported layout.
pub fn read_exon_ranges<P: AsRef<Path>>(path: P) -> AnalysisResult<Vec<GenomicRange>> {
    let path = path.as_ref();
    let mut text = String::new();
    open_input(path)?.read_to_string(&mut text)?;
    let ranges = parse_exon_ranges(&text)
        .map_err(|e| AnalysisError::parse(format!("{}: {}", path.display(), e)))?;
    log::info!("Loaded {} exon ranges from {}", ranges.len(), path.display());
    Ok(ranges)
}

pub fn parse_exon_ranges(text: &str) -> AnalysisResult<Vec<GenomicRange>> {
    if text.trim_start().starts_with("LOCUS") {
        return Ok(genbank::parse_genbank(text.trim_start())?.coding_ranges());
    }

    let is_gff = data_lines(text).any(|line| line.split('\t').count() == 9);
    if is_gff {
        parse_gff3(text)
    } else {
        parse_range_list(text)
    }
}

/// Non-empty lines outside comments, stopping at an embedded `##FASTA`.
fn data_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim_end)
        .take_while(|line| !line.starts_with("##FASTA"))
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
}

fn parse_coordinate(field: &str, line_no: usize) -> AnalysisResult<usize> {
    field
        .trim()
        .parse()
        .map_err(|_| AnalysisError::parse(format!("line {}: invalid coordinate '{}'", line_no, field)))
}

pub fn parse_gff3(text: &str) -> AnalysisResult<Vec<GenomicRange>> {
    let mut exons = Vec::new();
    let mut cds = Vec::new();

    for (idx, line) in data_lines(text).enumerate() {
        let line_no = idx + 1;
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 9 {
            return Err(AnalysisError::parse(format!(
                "GFF3 line {} must have 9 fields, found {}",
                line_no,
                fields.len()
            )));
        }

        let target = match fields[2] {
            "exon" => &mut exons,
            "CDS" => &mut cds,
            _ => continue,
        };
        let start = parse_coordinate(fields[3], line_no)?;
        let end = parse_coordinate(fields[4], line_no)?;
        target.push(GenomicRange::new(start, end)?);
    }

    if exons.is_empty() {
        log::debug!("No exon features in GFF3; using {} CDS features", cds.len());
        Ok(cds)
    } else {
        Ok(exons)
    }
}

pub fn parse_range_list(text: &str) -> AnalysisResult<Vec<GenomicRange>> {
    data_lines(text)
        .enumerate()
        .map(|(idx, line)| {
            let line_no = idx + 1;
            let fields: Vec<&str> = line
                .split(|c: char| c.is_whitespace() || c == ',' || c == '-')
                .filter(|f| !f.is_empty())
                .collect();
            match fields.as_slice() {
                [start, end] => GenomicRange::new(
                    parse_coordinate(start, line_no)?,
                    parse_coordinate(end, line_no)?,
                ),
                _ => Err(AnalysisError::parse(format!(
                    "line {}: expected 'start end', got '{}'",
                    line_no, line
                ))),
            }
        })
        .collect()
}
