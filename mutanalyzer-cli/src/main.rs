use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use mutanalyzer_core::{AlignMode, AnalysisError, CodonPhase, GeneticCodeId};
use std::path::PathBuf;

mod commands;
mod config;
mod error;
mod report;

use config::{Config, ReportFormat};
use error::{print_error_and_exit, CliError};

#[derive(Parser)]
#[command(name = "mutanalyzer")]
#[command(about = "MutAnalyzer - variant calling and coding-effect annotation")]
#[command(version)]
#[command(long_about = "
MutAnalyzer aligns a sample sequence against a reference, calls SNPs and
indels from the alignment, places them in exons or introns, classifies their
coding effect and optionally scores missense changes with SIFT/PolyPhen-style
heuristics.

Examples:
  mutanalyzer analyze --reference gene.gb --sample patient.fa
  mutanalyzer analyze --reference ref.fa --sample sample.fa --exons exons.gff3 --pathogenicity
  mutanalyzer call --aligned pair.fa --exons exons.txt --format json --output report.json
  mutanalyzer align --reference ref.fa --sample sample.fa --mode local
  mutanalyzer config --example > mutanalyzer.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Align a sample to a reference, then call and classify variants
    Analyze {
        /// Reference sequence (FASTA/FASTQ, optionally gzipped, or GenBank)
        #[arg(long, required = true)]
        reference: PathBuf,

        /// Sample sequence (FASTA/FASTQ, optionally gzipped)
        #[arg(long, required = true)]
        sample: PathBuf,

        /// Exon coordinates (GenBank, GFF3 or 'start end' list)
        #[arg(long)]
        exons: Option<PathBuf>,

        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Alignment mode
        #[arg(long)]
        mode: Option<ModeArg>,

        /// Alignment timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Classify variants in a pre-aligned two-record FASTA
    Call {
        /// Gapped FASTA with the reference first and the sample second
        #[arg(long, required = true)]
        aligned: PathBuf,

        /// Exon coordinates (GenBank, GFF3 or 'start end' list)
        #[arg(long)]
        exons: Option<PathBuf>,

        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the pairwise alignment of two sequences
    Align {
        /// Reference sequence file
        #[arg(long, required = true)]
        reference: PathBuf,

        /// Sample sequence file
        #[arg(long, required = true)]
        sample: PathBuf,

        /// Alignment mode
        #[arg(long)]
        mode: Option<ModeArg>,

        /// Alignment timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Columns per alignment block
        #[arg(long)]
        width: Option<usize>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration or a default example
    Config {
        /// Print the built-in defaults instead of the loaded configuration
        #[arg(long)]
        example: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Options shared by the commands that classify variants.
#[derive(clap::Args, Clone, Debug)]
pub struct AnalysisArgs {
    /// Genetic code used for translation
    #[arg(long)]
    code: Option<CodeArg>,

    /// How codon windows are phased
    #[arg(long)]
    codon_phase: Option<PhaseArg>,

    /// Score missense SNPs with SIFT/PolyPhen heuristics
    #[arg(long)]
    pathogenicity: bool,

    /// Report format
    #[arg(long)]
    format: Option<ReportFormat>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ModeArg {
    Global,
    Local,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum CodeArg {
    Standard,
    #[value(alias = "mito")]
    VertebrateMitochondrial,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PhaseArg {
    AlignmentIndex,
    ExonRelative,
}

impl From<ModeArg> for AlignMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Global => AlignMode::Global,
            ModeArg::Local => AlignMode::Local,
        }
    }
}

impl From<CodeArg> for GeneticCodeId {
    fn from(code: CodeArg) -> Self {
        match code {
            CodeArg::Standard => GeneticCodeId::Standard,
            CodeArg::VertebrateMitochondrial => GeneticCodeId::VertebrateMitochondrial,
        }
    }
}

impl From<PhaseArg> for CodonPhase {
    fn from(phase: PhaseArg) -> Self {
        match phase {
            PhaseArg::AlignmentIndex => CodonPhase::AlignmentIndex,
            PhaseArg::ExonRelative => CodonPhase::ExonRelative,
        }
    }
}

impl AnalysisArgs {
    /// Command-line flags take precedence over the configuration file.
    fn apply(&self, config: &mut Config) {
        if let Some(code) = self.code {
            config.analysis.genetic_code = code.into();
        }
        if let Some(phase) = self.codon_phase {
            config.analysis.codon_phase = phase.into();
        }
        if self.pathogenicity {
            config.report.pathogenicity = true;
        }
        if let Some(format) = self.format {
            config.report.format = format;
        }
    }
}

fn apply_alignment_flags(config: &mut Config, mode: Option<ModeArg>, timeout: Option<u64>) {
    if let Some(mode) = mode {
        config.analysis.alignment.mode = mode.into();
    }
    if let Some(timeout) = timeout {
        config.analysis.alignment.timeout_secs = timeout;
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        std::env::set_var("RUST_LOG", "error");
    } else {
        let level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", level);
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .init();
}

/// Recover the most specific user-facing error from a command failure.
fn to_cli_error(err: anyhow::Error) -> CliError {
    let err = match err.downcast::<CliError>() {
        Ok(cli_error) => return cli_error,
        Err(err) => err,
    };
    if let Some(analysis_error) = err.downcast_ref::<AnalysisError>() {
        // Keep any context message the command attached.
        return match analysis_error {
            AnalysisError::AlignmentTimeout(timeout) => CliError::AlignmentTimeout {
                seconds: timeout.as_secs(),
            },
            AnalysisError::InputValidation(_) | AnalysisError::InvalidRange { .. } => {
                CliError::validation(format!("{:#}", err))
            }
            AnalysisError::Parse(_) => CliError::parse("input".to_string(), format!("{:#}", err)),
            AnalysisError::AlignmentFailure(_) => CliError::alignment(format!("{:#}", err)),
            AnalysisError::WorkerFailure(_) => CliError::analysis(format!("{:#}", err)),
            AnalysisError::Io(_) => CliError::io(format!("{:#}", err)),
        };
    }
    if err.downcast_ref::<std::io::Error>().is_some() {
        return CliError::io(format!("{:#}", err));
    }
    CliError::config(format!("{:#}", err))
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    let show_progress = !cli.quiet;

    match cli.command {
        Commands::Analyze {
            reference,
            sample,
            exons,
            analysis,
            mode,
            timeout,
            output,
        } => {
            analysis.apply(&mut config);
            apply_alignment_flags(&mut config, mode, timeout);
            commands::analyze::execute(&config, reference, sample, exons, output, show_progress)?;
        }

        Commands::Call {
            aligned,
            exons,
            analysis,
            output,
        } => {
            analysis.apply(&mut config);
            commands::call::execute(&config, aligned, exons, output)?;
        }

        Commands::Align {
            reference,
            sample,
            mode,
            timeout,
            width,
            output,
        } => {
            apply_alignment_flags(&mut config, mode, timeout);
            if let Some(width) = width {
                config.report.width = width;
            }
            commands::align::execute(&config, reference, sample, output)?;
        }

        Commands::Config { example, output } => {
            commands::config::execute(&config, example, output)?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        print_error_and_exit(&to_cli_error(err));
    }
}
