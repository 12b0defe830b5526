//! Pairwise nucleotide alignment with a wall-clock timeout.
//!
//! The dynamic programming itself is delegated to `bio`. Each call runs on
//! its own worker thread and the result is awaited over a channel, so a
//! caller can give up on a pathological input and retry with another mode.
//! An abandoned worker finishes in the background and its result is dropped.

use bio::alignment::pairwise::Aligner;
use bio::alignment::{Alignment, AlignmentOperation};
use crossbeam_channel::{bounded, RecvTimeoutError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{AnalysisError, AnalysisResult};
use crate::sequence::{is_gap, normalize_sequence, ungapped, GAP};
use crate::types::AlignedPair;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignMode {
    #[default]
    Global,
    Local,
}

impl fmt::Display for AlignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignMode::Global => f.write_str("global"),
            AlignMode::Local => f.write_str("local"),
        }
    }
}

/// Scoring scheme and limits for one alignment.
///
/// `gap_open` is the total penalty of a length-1 gap; each further base
/// adds `gap_extend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignConfig {
    #[serde(default)]
    pub mode: AlignMode,
    #[serde(default = "default_match_score")]
    pub match_score: i32,
    #[serde(default = "default_mismatch_score")]
    pub mismatch_score: i32,
    #[serde(default = "default_gap_open")]
    pub gap_open: i32,
    #[serde(default = "default_gap_extend")]
    pub gap_extend: i32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_match_score() -> i32 {
    1
}

fn default_mismatch_score() -> i32 {
    -1
}

fn default_gap_open() -> i32 {
    -10
}

fn default_gap_extend() -> i32 {
    -1
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            mode: AlignMode::default(),
            match_score: default_match_score(),
            mismatch_score: default_mismatch_score(),
            gap_open: default_gap_open(),
            gap_extend: default_gap_extend(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AlignConfig {
    pub fn with_mode(mut self, mode: AlignMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `bio` charges `open + extend` for the first gap base.
    fn bio_gap_open(&self) -> i32 {
        self.gap_open - self.gap_extend
    }
}

/// Aligned pair plus the score reported by the aligner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseAlignment {
    pub pair: AlignedPair,
    pub score: i32,
    pub mode: AlignMode,
}

impl PairwiseAlignment {
    /// Number of columns where both sides carry the same base.
    pub fn identities(&self) -> usize {
        self.pair
            .reference()
            .iter()
            .zip(self.pair.sample())
            .filter(|(r, s)| r == s && !is_gap(**r))
            .count()
    }

    pub fn identity(&self) -> f64 {
        if self.pair.is_empty() {
            0.0
        } else {
            self.identities() as f64 / self.pair.len() as f64
        }
    }

    /// Render in blocks of `width` columns with a match line between the
    /// two sequences: `|` match, `.` mismatch, space for a gap.
    pub fn format_alignment(&self, width: usize) -> String {
        let width = width.max(1);
        let reference = self.pair.reference();
        let sample = self.pair.sample();
        let mut out = String::new();

        for (block, (r, s)) in reference.chunks(width).zip(sample.chunks(width)).enumerate() {
            if block > 0 {
                out.push('\n');
            }
            let start = block * width + 1;
            let matches: String = r
                .iter()
                .zip(s)
                .map(|(&a, &b)| match (is_gap(a) || is_gap(b), a == b) {
                    (true, _) => ' ',
                    (false, true) => '|',
                    (false, false) => '.',
                })
                .collect();
            out.push_str(&format!("Reference {:>8} {}\n", start, String::from_utf8_lossy(r)));
            out.push_str(&format!("{:>18} {}\n", "", matches));
            out.push_str(&format!("Sample    {:>8} {}\n", start, String::from_utf8_lossy(s)));
        }
        out
    }
}

pub trait SequenceAligner {
    fn align(&self, reference: &[u8], sample: &[u8]) -> AnalysisResult<PairwiseAlignment>;
    fn name(&self) -> &'static str;
}

/// Needleman-Wunsch / Smith-Waterman aligner with affine gaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairwiseAligner {
    config: AlignConfig,
}

impl PairwiseAligner {
    pub fn new(config: AlignConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Run the DP on the current thread, without a timeout.
    pub fn align_blocking(
        config: &AlignConfig,
        reference: &[u8],
        sample: &[u8],
    ) -> PairwiseAlignment {
        let match_score = config.match_score;
        let mismatch_score = config.mismatch_score;
        let score = move |a: u8, b: u8| {
            if a == b {
                match_score
            } else {
                mismatch_score
            }
        };

        let mut aligner = Aligner::with_capacity(
            reference.len(),
            sample.len(),
            config.bio_gap_open(),
            config.gap_extend,
            score,
        );
        let alignment = match config.mode {
            AlignMode::Global => aligner.global(reference, sample),
            AlignMode::Local => aligner.local(reference, sample),
        };

        let (aligned_ref, aligned_sample) = render_columns(&alignment, reference, sample);
        PairwiseAlignment {
            // Both rows are built from validated bases and gaps.
            pair: AlignedPair::from_validated(aligned_ref, aligned_sample),
            score: alignment.score,
            mode: config.mode,
        }
    }
}

impl SequenceAligner for PairwiseAligner {
    fn align(&self, reference: &[u8], sample: &[u8]) -> AnalysisResult<PairwiseAlignment> {
        let reference = ungapped(&normalize_sequence(reference)?);
        let sample = ungapped(&normalize_sequence(sample)?);
        if reference.is_empty() || sample.is_empty() {
            return Err(AnalysisError::validation("cannot align a sequence made only of gaps"));
        }

        let config = self.config;
        let timeout = config.timeout();
        log::info!(
            "Running {} {} alignment: {} bp vs {} bp (timeout {}s)",
            self.name(),
            config.mode,
            reference.len(),
            sample.len(),
            config.timeout_secs
        );

        let start_time = Instant::now();
        let alignment = run_with_timeout("pairwise-align", timeout, move || {
            PairwiseAligner::align_blocking(&config, &reference, &sample)
        })?;
        log::info!(
            "Alignment finished in {:.2}s: {} columns, score {}",
            start_time.elapsed().as_secs_f64(),
            alignment.pair.len(),
            alignment.score
        );
        Ok(alignment)
    }

    fn name(&self) -> &'static str {
        "pairwise"
    }
}

/// Run `job` on a named worker thread and wait at most `timeout` for it.
///
/// On timeout the worker is abandoned, since the alignment kernels cannot be
/// cancelled; its result is dropped when it eventually finishes.
fn run_with_timeout<T, F>(name: &str, timeout: Duration, job: F) -> AnalysisResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = bounded(1);
    thread::Builder::new().name(name.to_string()).spawn(move || {
        // Receiver is gone if the caller already timed out.
        let _ = tx.send(job());
    })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => Ok(result),
        Err(RecvTimeoutError::Timeout) => {
            log::warn!("{} exceeded {}s, abandoning worker", name, timeout.as_secs());
            Err(AnalysisError::AlignmentTimeout(timeout))
        }
        Err(RecvTimeoutError::Disconnected) => Err(AnalysisError::AlignmentFailure(format!(
            "{} worker terminated without a result",
            name
        ))),
    }
}

/// Expand `bio` operations into two gapped rows covering both inputs in full.
///
/// Unaligned reference flanks become deletion columns and unaligned sample
/// flanks become insertion columns.
fn render_columns(alignment: &Alignment, x: &[u8], y: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let capacity = x.len() + y.len();
    let mut row_x = Vec::with_capacity(capacity);
    let mut row_y = Vec::with_capacity(capacity);

    push_x_only(&mut row_x, &mut row_y, &x[..alignment.xstart]);
    push_y_only(&mut row_x, &mut row_y, &y[..alignment.ystart]);

    let (mut i, mut j) = (alignment.xstart, alignment.ystart);
    for op in &alignment.operations {
        match op {
            AlignmentOperation::Match | AlignmentOperation::Subst => {
                row_x.push(x[i]);
                row_y.push(y[j]);
                i += 1;
                j += 1;
            }
            AlignmentOperation::Ins => {
                row_x.push(x[i]);
                row_y.push(GAP);
                i += 1;
            }
            AlignmentOperation::Del => {
                row_x.push(GAP);
                row_y.push(y[j]);
                j += 1;
            }
            AlignmentOperation::Xclip(_) | AlignmentOperation::Yclip(_) => {}
        }
    }

    push_x_only(&mut row_x, &mut row_y, &x[alignment.xend.max(i)..]);
    push_y_only(&mut row_x, &mut row_y, &y[alignment.yend.max(j)..]);
    (row_x, row_y)
}

fn push_x_only(rx: &mut Vec<u8>, ry: &mut Vec<u8>, bases: &[u8]) {
    rx.extend_from_slice(bases);
    ry.extend(std::iter::repeat(GAP).take(bases.len()));
}

fn push_y_only(rx: &mut Vec<u8>, ry: &mut Vec<u8>, bases: &[u8]) {
    rx.extend(std::iter::repeat(GAP).take(bases.len()));
    ry.extend_from_slice(bases);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn align(reference: &str, sample: &str, mode: AlignMode) -> PairwiseAlignment {
        PairwiseAligner::new(AlignConfig::default().with_mode(mode))
            .align(reference.as_bytes(), sample.as_bytes())
            .unwrap()
    }

    #[test]
    fn test_default_scoring() {
        let config = AlignConfig::default();
        assert_eq!(config.match_score, 1);
        assert_eq!(config.mismatch_score, -1);
        assert_eq!(config.gap_open, -10);
        assert_eq!(config.gap_extend, -1);
        assert_eq!(config.timeout(), Duration::from_secs(300));
        assert_eq!(config.bio_gap_open(), -9);
    }

    #[test]
    fn test_global_identical() {
        let result = align("ATGCGTACC", "ATGCGTACC", AlignMode::Global);
        assert_eq!(result.pair.reference(), b"ATGCGTACC");
        assert_eq!(result.pair.sample(), b"ATGCGTACC");
        assert_eq!(result.score, 9);
        assert_eq!(result.identities(), 9);
    }

    #[test]
    fn test_global_substitution() {
        let result = align("ATGCGTACC", "ATGAGTACC", AlignMode::Global);
        assert_eq!(result.pair.sample(), b"ATGAGTACC");
        assert_eq!(result.score, 7);
    }

    #[test]
    fn test_global_gap_penalty() {
        // One 3-base gap costs -10 -1 -1 = -12 against 12 matches.
        let reference = "AAAACCCCGGGGTTT";
        let sample = "AAAACCCCGGGG";
        let result = align(reference, sample, AlignMode::Global);
        assert_eq!(result.pair.len(), reference.len());
        assert_eq!(result.pair.reference_length(), reference.len());
        assert_eq!(result.pair.sample_length(), sample.len());
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_local_output_spans_both_inputs() {
        let result = align("TTTTATGCGTACCTTTT", "GGATGCGTACCGG", AlignMode::Local);
        assert_eq!(result.pair.reference_length(), 17);
        assert_eq!(result.pair.sample_length(), 13);
        assert_eq!(result.mode, AlignMode::Local);
        assert!(result.score >= 9);
    }

    #[test]
    fn test_rejects_invalid_input() {
        let aligner = PairwiseAligner::default();
        let err = aligner.align(b"ATGX", b"ATG").unwrap_err();
        assert!(matches!(err, AnalysisError::InputValidation(_)));
        assert!(aligner.align(b"---", b"ATG").is_err());
    }

    #[test]
    fn test_zero_timeout_reports_timeout_or_result() {
        let config = AlignConfig {
            timeout_secs: 0,
            ..AlignConfig::default()
        };
        match PairwiseAligner::new(config).align(b"ATGCGT", b"ATGAGT") {
            Ok(result) => assert_eq!(result.pair.len(), 6),
            Err(err) => assert!(matches!(err, AnalysisError::AlignmentTimeout(_))),
        }
    }

    #[test]
    fn test_blocked_worker_times_out() {
        let (release_tx, release_rx) = bounded::<()>(1);
        let result = run_with_timeout("blocked-worker", Duration::from_millis(50), move || {
            let _ = release_rx.recv();
            1
        });
        assert!(matches!(
            result,
            Err(AnalysisError::AlignmentTimeout(timeout)) if timeout == Duration::from_millis(50)
        ));
        release_tx.send(()).unwrap();
    }

    #[test]
    fn test_worker_result_within_timeout() {
        let result = run_with_timeout("quick-worker", Duration::from_secs(5), || 42);
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_panicking_worker_reports_failure() {
        let result = run_with_timeout("panicking-worker", Duration::from_secs(5), || -> u32 {
            panic!("kernel fault")
        });
        match result {
            Err(AnalysisError::AlignmentFailure(message)) => {
                assert!(message.contains("panicking-worker"))
            }
            other => panic!("expected alignment failure, got {:?}", other),
        }
    }

    #[test]
    fn test_format_alignment_blocks() {
        let pair = AlignedPair::new(b"ATG--GCA", b"ATGTTGCC").unwrap();
        let alignment = PairwiseAlignment {
            pair,
            score: 0,
            mode: AlignMode::Global,
        };
        let text = alignment.format_alignment(4);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Reference        1 ATG-");
        assert_eq!(lines[1], "                   ||| ");
        assert_eq!(lines[2], "Sample           1 ATGT");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Reference        5 -GCA");
        assert_eq!(lines[5], "                    ||.");
    }
}
