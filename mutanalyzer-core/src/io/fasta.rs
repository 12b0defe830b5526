//! FASTA/FASTQ sequence input
//!
//! Records are parsed with needletail; gzipped files are decompressed with
//! flate2 first. A file without any header line is read as one bare
//! sequence, which is how sequences pasted into a text file usually arrive.
//! GenBank flat files are accepted too, through [`super::genbank`].

use flate2::read::GzDecoder;
use needletail::parse_fastx_reader;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use thiserror::Error;

use super::genbank;
use crate::error::{AnalysisError, AnalysisResult};
use crate::sequence::normalize_sequence;
use crate::types::AlignedPair;

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Empty file or no sequences found")]
    EmptyFile,
    #[error("Expected {expected} sequences, found {found}")]
    RecordCount { expected: usize, found: usize },
}

impl From<FastaError> for AnalysisError {
    fn from(err: FastaError) -> Self {
        match err {
            FastaError::Io(e) => AnalysisError::Io(e),
            other => AnalysisError::Parse(other.to_string()),
        }
    }
}

/// One named sequence as read from disk, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub seq: Vec<u8>,
}

pub struct FastaParser;

impl FastaParser {
    /// Parse every record in `path`, decompressing `.gz` files.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<SequenceRecord>, FastaError> {
        let path = path.as_ref();
        let mut bytes = Vec::new();
        open_input(path)?.read_to_end(&mut bytes)?;

        let fallback_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sequence".to_string());
        Self::parse_bytes(&bytes, &fallback_id)
    }

    /// Parse in-memory FASTA, FASTQ, GenBank or bare sequence text.
    pub fn parse_bytes(bytes: &[u8], fallback_id: &str) -> Result<Vec<SequenceRecord>, FastaError> {
        let Some(start) = bytes.iter().position(|b| !b.is_ascii_whitespace()) else {
            return Err(FastaError::EmptyFile);
        };
        let content = &bytes[start..];
        match content[0] {
            b'>' | b'@' => Self::parse_reader(Cursor::new(content.to_vec())),
            _ if content.starts_with(b"LOCUS") => {
                let text = String::from_utf8_lossy(content);
                let record = genbank::parse_genbank(&text)
                    .map_err(|e| FastaError::Parse(e.to_string()))?;
                Ok(vec![SequenceRecord {
                    id: record.name,
                    seq: record.sequence,
                }])
            }
            _ => Ok(vec![SequenceRecord {
                id: fallback_id.to_string(),
                seq: bytes.to_vec(),
            }]),
        }
    }

    /// Parse FASTA/FASTQ data from any readable source.
    pub fn parse_reader<R: Read + Send>(reader: R) -> Result<Vec<SequenceRecord>, FastaError> {
        let mut records = Vec::new();
        let mut fastx_reader =
            parse_fastx_reader(reader).map_err(|e| FastaError::Parse(e.to_string()))?;

        while let Some(record) = fastx_reader.next() {
            let record = record.map_err(|e| FastaError::Parse(e.to_string()))?;
            // needletail returns the whole header; keep the first word.
            let header = String::from_utf8_lossy(record.id()).into_owned();
            let id = header.split_whitespace().next().unwrap_or_default().to_string();
            records.push(SequenceRecord {
                id,
                seq: record.seq().into_owned(),
            });
        }

        if records.is_empty() {
            Err(FastaError::EmptyFile)
        } else {
            Ok(records)
        }
    }
}

/// Open `path` for reading, decompressing it when the name ends in `.gz`.
pub(crate) fn open_input(path: &Path) -> std::io::Result<Box<dyn Read>> {
    let file = File::open(path)?;
    if path.to_string_lossy().ends_with(".gz") {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// First sequence in `path`, normalised to uppercase `{A,C,G,T,N,-}`.
pub fn read_sequence<P: AsRef<Path>>(path: P) -> AnalysisResult<Vec<u8>> {
    let path = path.as_ref();
    let records = FastaParser::parse_file(path)?;
    let record = records.into_iter().next().ok_or(FastaError::EmptyFile)?;
    log::debug!("Read sequence '{}' from {}", record.id, path.display());
    normalize_sequence(&record.seq).map_err(|e| match e {
        AnalysisError::InputValidation(msg) => {
            AnalysisError::validation(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Pre-aligned pair: first record is the reference, second the sample.
pub fn read_aligned_pair<P: AsRef<Path>>(path: P) -> AnalysisResult<AlignedPair> {
    let path = path.as_ref();
    let records = FastaParser::parse_file(path)?;
    aligned_pair_from_records(&records)
}

pub fn aligned_pair_from_records(records: &[SequenceRecord]) -> AnalysisResult<AlignedPair> {
    match records {
        [reference, sample, rest @ ..] => {
            if !rest.is_empty() {
                log::warn!(
                    "Ignoring {} extra records after '{}' and '{}'",
                    rest.len(),
                    reference.id,
                    sample.id
                );
            }
            AlignedPair::new(&reference.seq, &sample.seq)
        }
        _ => Err(FastaError::RecordCount {
            expected: 2,
            found: records.len(),
        }
        .into()),
    }
}
