pub mod commands;
pub mod report;

use crate::checksum::HashAlgorithm;
use crate::config::SeriesOverrides;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for bidskit
#[derive(Parser, Debug)]
#[command(name = "bidskit")]
#[command(about = "MRI series classification, fieldmap linking and BIDS metadata QC")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assign scanner series to sequence roles
    Classify(ClassifyArgs),
    /// Show the BIDS file each classified series would be written to
    Plan(PlanArgs),
    /// Write fieldmap/BOLD linkage metadata into BIDS sidecars
    LinkFmap(LinkArgs),
    /// Verify produced BIDS files against the expected sequences
    Qc(QcArgs),
    /// Summarize a volume-check diagnostic CSV
    Summarize(SummarizeArgs),
    /// Print the effective scan configuration
    Config(ConfigArgs),
}

/// Where the classification rules come from
#[derive(Args, Debug, Clone)]
pub struct RuleArgs {
    /// Scan configuration JSON (omit to use the built-in description heuristic)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Experiment type selecting the sequences to classify
    #[arg(short, long, default_value = crate::config::BASIC_EXPERIMENT)]
    pub experiment_type: String,

    /// Task label used by the built-in heuristic
    #[arg(short, long, default_value = "rest", value_parser = parse_label)]
    pub task: String,

    /// Replace a sequence's series numbers, e.g. `--series t1=3` or `--series bold=5,7`
    #[arg(long = "series", value_name = "NAME=N[,N...]", value_parser = parse_series_override)]
    pub series: Vec<(String, Vec<i32>)>,
}

impl RuleArgs {
    pub fn overrides(&self) -> SeriesOverrides {
        self.series.iter().cloned().collect()
    }
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Directory containing the subject's DICOM files
    #[arg(value_name = "DICOM_DIR")]
    pub dicom_dir: PathBuf,

    #[command(flatten)]
    pub rules: RuleArgs,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Directory containing the subject's DICOM files
    #[arg(value_name = "DICOM_DIR")]
    pub dicom_dir: PathBuf,

    /// Subject label, with or without the `sub-` prefix
    #[arg(short, long, value_parser = parse_subject)]
    pub subject: String,

    #[command(flatten)]
    pub rules: RuleArgs,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// BIDS dataset root
    #[arg(short, long, value_name = "DIR")]
    pub bids_dir: PathBuf,

    /// Subject label, with or without the `sub-` prefix
    #[arg(short, long, value_parser = parse_subject)]
    pub subject: String,

    /// Task label of the BOLD runs
    #[arg(short, long, value_parser = parse_label)]
    pub task: String,

    /// JSON object mapping run labels to fieldmap ids, e.g. `{"01": "1"}`
    #[arg(short, long, value_name = "FILE")]
    pub run_map: PathBuf,
}

#[derive(Args, Debug)]
pub struct QcArgs {
    /// BIDS dataset root
    #[arg(short, long, value_name = "DIR")]
    pub bids_dir: PathBuf,

    /// Subject label, with or without the `sub-` prefix
    #[arg(short, long, value_parser = parse_subject)]
    pub subject: String,

    /// Scan configuration JSON
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// Directory receiving `qc-verify_nii_metadata/`
    #[arg(short, long, value_name = "DIR")]
    pub log_dir: PathBuf,

    /// Replace a sequence's series numbers, e.g. `--series t1=3`
    #[arg(long = "series", value_name = "NAME=N[,N...]", value_parser = parse_series_override)]
    pub series: Vec<(String, Vec<i32>)>,
}

impl QcArgs {
    pub fn overrides(&self) -> SeriesOverrides {
        self.series.iter().cloned().collect()
    }
}

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Diagnostic CSV with subject_id, scan_type, run_number, expected_volumes,
    /// actual_volumes and status columns
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Directory receiving `diagnostic_summary.txt`
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Scan configuration JSON
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// Replace a sequence's series numbers before printing
    #[arg(long = "series", value_name = "NAME=N[,N...]", value_parser = parse_series_override)]
    pub series: Vec<(String, Vec<i32>)>,
}

impl ConfigArgs {
    pub fn overrides(&self) -> SeriesOverrides {
        self.series.iter().cloned().collect()
    }
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

/// Command-line arguments for dirsum
#[derive(Parser, Debug)]
#[command(name = "dirsum")]
#[command(about = "Compare the file checksums of two directory trees")]
#[command(version)]
pub struct DirsumCli {
    /// First directory
    #[arg(value_name = "DIR1")]
    pub first: PathBuf,

    /// Second directory
    #[arg(value_name = "DIR2")]
    pub second: PathBuf,

    /// Hash algorithm
    #[arg(short, long, default_value = "sha256")]
    pub algorithm: HashAlgorithm,

    /// Verbose logging, also listing matching files
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses `NAME=1,2,3` into a sequence name and its series numbers
pub fn parse_series_override(s: &str) -> std::result::Result<(String, Vec<i32>), String> {
    let (name, numbers) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=N[,N...], got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing sequence name in '{}'", s));
    }

    let numbers = numbers
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| {
            n.parse::<i32>()
                .map_err(|_| format!("invalid series number '{}' for {}", n, name))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    if numbers.is_empty() {
        return Err(format!("no series numbers given for {}", name));
    }

    Ok((name.to_string(), numbers))
}

/// Accepts a BIDS label: non-empty and alphanumeric only
pub fn parse_label(s: &str) -> std::result::Result<String, String> {
    if s.is_empty() {
        return Err("label must not be empty".to_string());
    }
    if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!("'{}' is not a valid BIDS label (letters and digits only)", s));
    }
    Ok(s.to_string())
}

/// Accepts a subject label, stripping an optional `sub-` prefix
pub fn parse_subject(s: &str) -> std::result::Result<String, String> {
    parse_label(s.strip_prefix("sub-").unwrap_or(s))
}
