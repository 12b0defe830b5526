//! GenBank flat-file input.
//!
//! Records are parsed with gb_io. Only what a gene record needs for
//! variant annotation is kept: the locus name, the chromosome qualifier of
//! the `source` feature, `exon` and `CDS` feature bounds, and the ORIGIN
//! sequence. Compound locations (`join`, `order`, `complement`) collapse to
//! the outer bounds of their local parts; parts that point into another
//! entry (`AB012345.1:100..200`) are not coordinates of this sequence and
//! are skipped.

use gb_io::reader::SeqReader;
use gb_io::seq::{Feature, Location, Seq};
use std::io::Read;
use std::path::Path;

use super::fasta::open_input;
use crate::error::{AnalysisError, AnalysisResult};
use crate::types::GenomicRange;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenBankRecord {
    pub name: String,
    pub chromosome: Option<String>,
    pub sequence: Vec<u8>,
    pub exons: Vec<GenomicRange>,
    pub cds: Vec<GenomicRange>,
}

impl GenBankRecord {
    /// Exon features, or CDS features when no exon is annotated.
    pub fn coding_ranges(&self) -> Vec<GenomicRange> {
        if self.exons.is_empty() {
            self.cds.clone()
        } else {
            self.exons.clone()
        }
    }
}

/// True if the file's first non-blank text is a `LOCUS` line. Gzipped
/// files are decompressed before the check.
pub fn is_genbank_file<P: AsRef<Path>>(path: P) -> AnalysisResult<bool> {
    let mut head = Vec::with_capacity(512);
    open_input(path.as_ref())?.take(512).read_to_end(&mut head)?;
    let start = head.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(head.len());
    Ok(head[start..].starts_with(b"LOCUS"))
}

/// First record of a GenBank file, which may be gzipped.
pub fn read_genbank<P: AsRef<Path>>(path: P) -> AnalysisResult<GenBankRecord> {
    let path = path.as_ref();
    parse_genbank_reader(open_input(path)?)
        .map_err(|e| AnalysisError::parse(format!("{}: {}", path.display(), e)))
}

pub fn parse_genbank(text: &str) -> AnalysisResult<GenBankRecord> {
    parse_genbank_reader(text.as_bytes())
}

fn parse_genbank_reader<R: Read>(reader: R) -> AnalysisResult<GenBankRecord> {
    let seq = SeqReader::new(reader)
        .next()
        .ok_or_else(|| AnalysisError::parse("no GenBank record found"))?
        .map_err(|e| AnalysisError::parse(format!("invalid GenBank record: {}", e)))?;
    record_from_seq(seq)
}

fn record_from_seq(seq: Seq) -> AnalysisResult<GenBankRecord> {
    let mut record = GenBankRecord {
        name: seq.name.clone().unwrap_or_default(),
        sequence: seq.seq.to_ascii_uppercase(),
        ..Default::default()
    };

    for feature in &seq.features {
        let kind = feature.kind.to_string();
        if kind.eq_ignore_ascii_case("source") {
            if record.chromosome.is_none() {
                record.chromosome = qualifier(feature, "chromosome");
            }
            continue;
        }
        let target = if kind.eq_ignore_ascii_case("exon") {
            &mut record.exons
        } else if kind == "CDS" {
            &mut record.cds
        } else {
            continue;
        };
        match local_bounds(&feature.location)? {
            Some(range) => target.push(range),
            None => log::warn!(
                "Skipping {} feature of '{}' without local coordinates: {:?}",
                kind,
                record.name,
                feature.location
            ),
        }
    }

    log::debug!(
        "GenBank record '{}': {} bp, {} exon and {} CDS features",
        record.name,
        record.sequence.len(),
        record.exons.len(),
        record.cds.len()
    );
    Ok(record)
}

fn qualifier(feature: &Feature, key: &str) -> Option<String> {
    feature
        .qualifier_values(key.into())
        .next()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Outer 1-based inclusive bounds of the parts of `location` that lie on
/// this sequence, or `None` when every part is remote or a gap.
fn local_bounds(location: &Location) -> AnalysisResult<Option<GenomicRange>> {
    let mut spans = Vec::new();
    collect_local_spans(location, &mut spans);

    let start = spans.iter().map(|&(start, _)| start).min();
    let end = spans.iter().map(|&(_, end)| end).max();
    match (start, end) {
        (Some(start), Some(end)) => {
            let start = usize::try_from(start + 1)
                .map_err(|_| AnalysisError::parse(format!("negative location start: {:?}", location)))?;
            let end = usize::try_from(end)
                .map_err(|_| AnalysisError::parse(format!("negative location end: {:?}", location)))?;
            GenomicRange::new(start, end).map(Some)
        }
        _ => Ok(None),
    }
}

/// Zero-based, end-exclusive spans of every local part of `location`.
fn collect_local_spans(location: &Location, out: &mut Vec<(i64, i64)>) {
    match location {
        Location::Range((a, _), (b, _)) => out.push(((*a).min(*b), (*a).max(*b))),
        Location::Between(a, b) => out.push(((*a).min(*b), (*a).max(*b) + 1)),
        Location::Complement(inner) => collect_local_spans(inner, out),
        Location::Join(parts)
        | Location::Order(parts)
        | Location::Bond(parts)
        | Location::OneOf(parts) => {
            for part in parts {
                collect_local_spans(part, out);
            }
        }
        // Coordinates of another entry.
        Location::External(..) => {}
        Location::Gap(_) => {}
    }
}
