//! Error handling for the MutAnalyzer CLI

use mutanalyzer_core::AnalysisError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for MutAnalyzer CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input/Output error: {message}")]
    Io { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Parsing error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Invalid input: {message}")]
    Validation { message: String },

    #[error("Alignment timed out after {seconds}s")]
    AlignmentTimeout { seconds: u64 },

    #[error("Alignment error: {message}")]
    Alignment { message: String },

    #[error("Analysis error: {message}")]
    Analysis { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn parse<S: Into<String>>(file: S, message: S) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn alignment<S: Into<String>>(message: S) -> Self {
        Self::Alignment {
            message: message.into(),
        }
    }

    pub fn analysis<S: Into<String>>(message: S) -> Self {
        Self::Analysis {
            message: message.into(),
        }
    }

    /// Require that an input path exists before any work starts.
    pub fn check_exists(path: &std::path::Path) -> CliResult<()> {
        if path.exists() {
            Ok(())
        } else {
            Err(Self::file_not_found(path.to_path_buf()))
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("TOML parsing error: {}", err))
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        Self::config(format!("TOML serialization error: {}", err))
    }
}

impl From<AnalysisError> for CliError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InputValidation(message) => Self::validation(message),
            AnalysisError::InvalidRange { .. } => Self::validation(err.to_string()),
            AnalysisError::AlignmentTimeout(timeout) => Self::AlignmentTimeout {
                seconds: timeout.as_secs(),
            },
            AnalysisError::AlignmentFailure(message) => Self::alignment(message),
            AnalysisError::WorkerFailure(_) => Self::analysis(err.to_string()),
            AnalysisError::Parse(message) => Self::parse("input".to_string(), message),
            AnalysisError::Io(e) => Self::io(e.to_string()),
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file\n\
                 • Compressed FASTA must use the .gz extension",
                path.display()
            ));
        }

        CliError::Validation { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Sequences may only contain A, C, G, T, N and '-'\n\
                 • Aligned inputs for 'mutanalyzer call' must have equal lengths\n\
                 • Exon coordinates are 1-based and inclusive (start <= end)",
            );
        }

        CliError::AlignmentTimeout { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Retry with --mode local to align only the best-matching region\n\
                 • Raise the limit with --timeout or [analysis.alignment] timeout_secs\n\
                 • Align externally and use 'mutanalyzer call --aligned'",
            );
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your mutanalyzer.toml configuration file\n\
                 • Use 'mutanalyzer config --example' to generate a sample configuration\n\
                 • Verify that all configuration values are valid",
            );
        }

        CliError::Parse { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Exon files may be GenBank, GFF3 or 'start end' lines\n\
                 • Sequence files may be FASTA, FASTQ, GenBank or bare sequence text",
            );
        }

        CliError::Analysis { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Re-run with -vv to see debug logging from the classifier and scorer\n\
                 • Use 'mutanalyzer call --aligned' to classify a saved alignment directly",
            );
        }

        _ => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}
