//! Error types for the analysis engine

use std::time::Duration;
use thiserror::Error;

/// Errors that abort an analysis run.
///
/// Failures scoped to a single variant (an unresolvable codon, a missing
/// amino acid in a lookup table) never surface here; they degrade that
/// variant's fields instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Input validation failed: {0}")]
    InputValidation(String),

    #[error("Invalid genomic range {start}-{end}: start must be >= 1 and <= end")]
    InvalidRange { start: usize, end: usize },

    #[error("Alignment timed out after {}s", .0.as_secs())]
    AlignmentTimeout(Duration),

    #[error("Alignment failed: {0}")]
    AlignmentFailure(String),

    /// The analysis worker died (for example, a panic while classifying or
    /// scoring) before reporting a result.
    #[error("Analysis worker failed: {0}")]
    WorkerFailure(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::InputValidation(message.into())
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// True for the errors a caller may recover from by retrying the
    /// alignment with a different mode.
    pub fn is_alignment_error(&self) -> bool {
        matches!(self, Self::AlignmentTimeout(_) | Self::AlignmentFailure(_))
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::validation("aligned sequences differ in length");
        assert_eq!(
            err.to_string(),
            "Input validation failed: aligned sequences differ in length"
        );

        let err = AnalysisError::AlignmentTimeout(Duration::from_secs(300));
        assert_eq!(err.to_string(), "Alignment timed out after 300s");
        assert!(err.is_alignment_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AnalysisError = io_err.into();
        assert!(matches!(err, AnalysisError::Io(_)));
        assert!(!err.is_alignment_error());
    }

    #[test]
    fn test_worker_failure_is_not_alignment_error() {
        let err = AnalysisError::WorkerFailure("terminated without a result".to_string());
        assert_eq!(err.to_string(), "Analysis worker failed: terminated without a result");
        assert!(!err.is_alignment_error());
    }
}
