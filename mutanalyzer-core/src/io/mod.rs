//! File input: sequences, pre-computed alignments and exon annotations.

pub mod exons;
pub mod fasta;
pub mod genbank;

pub use exons::{parse_exon_ranges, read_exon_ranges};
pub use fasta::{read_aligned_pair, read_sequence, FastaError, FastaParser, SequenceRecord};
pub use genbank::{is_genbank_file, parse_genbank, read_genbank, GenBankRecord};
