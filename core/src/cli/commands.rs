//! Subcommand execution for the `bidskit` binary

use super::report::{
    ClassificationReport, ConfigReport, DiagnosticsReport, LinkReport, PlanReport, QcReport,
};
use super::{ClassifyArgs, Command, LinkArgs, OutputFormat, QcArgs, RuleArgs, SummarizeArgs};
use crate::classification::{classify, plan_outputs, ClassificationResult, RoleRules};
use crate::config::{SequenceConfig, SeriesOverrides};
use crate::diagnostics::Diagnostics;
use crate::error::{BidsError, Result};
use crate::extraction::scan_series;
use crate::fieldmap::{
    apply_to_dataset, discover_functional_runs, link, parse_run_map, BidsLayout, FieldmapLink,
    LinkSummary,
};
use crate::qc::{collect_produced_files, qc_report_path, verify, write_qc_report, QcRecord};
use crate::summary::{load_diagnostics, summarize, write_summary};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Runs one subcommand, printing its report to stdout
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Classify(args) => {
            let mut diagnostics = Diagnostics::new();
            let (result, _) = classify_dicom_dir(&args, &mut diagnostics)?;
            match args.format {
                OutputFormat::Text => {
                    println!("{}", ClassificationReport::new(&result));
                    println!("\n{}", DiagnosticsReport::new(&diagnostics));
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&result.to_map())?)
                }
            }
        }
        Command::Plan(args) => {
            let mut diagnostics = Diagnostics::new();
            let classify_args = ClassifyArgs {
                dicom_dir: args.dicom_dir.clone(),
                rules: args.rules.clone(),
                format: args.format.clone(),
            };
            let (result, rules) = classify_dicom_dir(&classify_args, &mut diagnostics)?;
            let outputs = plan_outputs(&result, &rules, &args.subject);
            match args.format {
                OutputFormat::Text => print!("{}", PlanReport::new(&outputs)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outputs)?),
            }
        }
        Command::LinkFmap(args) => {
            let mut diagnostics = Diagnostics::new();
            let (links, summary) = link_fieldmaps(&args, &mut diagnostics)?;
            println!("{}", LinkReport::new(&links, &summary));
            println!("\n{}", DiagnosticsReport::new(&diagnostics));
        }
        Command::Qc(args) => {
            let (path, records) = run_qc(&args)?;
            println!("{}", QcReport::new(&records));
            println!("\nReport: {}", path.display());
        }
        Command::Summarize(args) => match summarize_diagnostics(&args)? {
            Some(path) => println!("Summary report saved to: {}", path.display()),
            None => println!("No diagnostic data to summarize"),
        },
        Command::Config(args) => {
            let config = load_config(&args.config, &args.overrides())?;
            print!("{}", ConfigReport::new(&config));
        }
    }
    Ok(())
}

fn require_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(BidsError::MissingInput(path.to_path_buf()))
    }
}

fn load_config(path: &Path, overrides: &SeriesOverrides) -> Result<SequenceConfig> {
    let mut config = SequenceConfig::load(path)?;
    config.apply_overrides(overrides);
    config.log_summary();
    Ok(config)
}

/// Builds role rules from a configuration file, or the built-in heuristic
pub fn load_rules(args: &RuleArgs) -> Result<RoleRules> {
    match &args.config {
        Some(path) => {
            let config = load_config(path, &args.overrides())?;
            RoleRules::from_config(&config, &args.experiment_type)
        }
        None => {
            if !args.series.is_empty() {
                warn!("--series overrides need --config and are ignored by the heuristic");
            }
            info!("No configuration given, using description heuristic");
            Ok(RoleRules::heuristic(&args.task))
        }
    }
}

/// Scans a DICOM directory and classifies its series
pub fn classify_dicom_dir(
    args: &ClassifyArgs,
    diagnostics: &mut Diagnostics,
) -> Result<(ClassificationResult, RoleRules)> {
    require_dir(&args.dicom_dir)?;
    let rules = load_rules(&args.rules)?;

    info!("Processing directory: {}", args.dicom_dir.display());
    let series = scan_series(&args.dicom_dir)?;
    if series.is_empty() {
        warn!("No DICOM series found in {}", args.dicom_dir.display());
    }

    let result = classify(&series, &rules, diagnostics);
    Ok((result, rules))
}

/// Links fieldmaps to BOLD runs and rewrites the affected sidecars
pub fn link_fieldmaps(
    args: &LinkArgs,
    diagnostics: &mut Diagnostics,
) -> Result<(Vec<FieldmapLink>, LinkSummary)> {
    require_dir(&args.bids_dir)?;
    if !args.run_map.is_file() {
        return Err(BidsError::MissingInput(args.run_map.clone()));
    }
    let run_map = parse_run_map(&fs::read_to_string(&args.run_map)?)?;

    let layout = BidsLayout::new(&args.bids_dir, &args.subject, &args.task);
    let functional_runs = discover_functional_runs(&layout)?;
    info!(
        "Found {} functional runs for sub-{}",
        functional_runs.len(),
        args.subject
    );

    let links = link(&run_map, &functional_runs, diagnostics);
    let summary = apply_to_dataset(&layout, &links, diagnostics);
    Ok((links, summary))
}

fn qc_records(args: &QcArgs) -> Result<Vec<QcRecord>> {
    let config = load_config(&args.config, &args.overrides())?;
    let expected = config.expected_by_series_number();

    let subject_dir = args.bids_dir.join(format!("sub-{}", args.subject));
    require_dir(&subject_dir)?;

    let files = collect_produced_files(&subject_dir)?;
    info!("Checking {} files for sub-{}", files.len(), args.subject);
    Ok(verify(&expected, &files))
}

/// Runs QC and writes the report
///
/// The report is written even when QC itself fails, so downstream steps
/// always find a file (header only in that case).
pub fn run_qc(args: &QcArgs) -> Result<(PathBuf, Vec<QcRecord>)> {
    let path = qc_report_path(&args.log_dir, &args.subject);
    let outcome = qc_records(args);

    let empty = Vec::new();
    write_qc_report(&path, outcome.as_ref().unwrap_or(&empty))?;
    info!("QC summary written to {}", path.display());

    Ok((path, outcome?))
}

/// Summarizes a diagnostic CSV; `None` when it holds no rows
pub fn summarize_diagnostics(args: &SummarizeArgs) -> Result<Option<PathBuf>> {
    if !args.input.is_file() {
        return Err(BidsError::MissingInput(args.input.clone()));
    }

    let rows = load_diagnostics(&args.input)?;
    if rows.is_empty() {
        warn!("No diagnostic data found in {}", args.input.display());
        return Ok(None);
    }

    let summary = summarize(&rows);
    let path = write_summary(&args.output_dir, &summary)?;
    info!("Summary report saved to: {}", path.display());
    Ok(Some(path))
}
