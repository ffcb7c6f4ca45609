use super::record::{QcFlag, QcRecord, INVALID_JSON, MISSING_JSON};
use super::run::{extract_run, filename_run, format_run};
use crate::config::ExpectedSeriesMap;
use crate::error::{BidsError, Result};
use crate::sidecar::{read_sidecar, sidecar_path, strip_nifti_extension, Sidecar};
use crate::template::fill_int;
use crate::types::SequenceDefinition;
use log::{debug, warn};
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// BIDS modality folders inspected by QC, in report order
pub const QC_MODALITIES: [&str; 3] = ["func", "anat", "fmap"];

/// What was found next to an image
#[derive(Debug, Clone, PartialEq)]
pub enum SidecarState {
    Present(Sidecar),
    Missing,
    Invalid(String),
}

/// One produced image and its sidecar
#[derive(Debug, Clone, PartialEq)]
pub struct ProducedFile {
    /// Image file name without `.nii.gz`
    pub filename: String,
    pub sidecar: SidecarState,
}

impl ProducedFile {
    pub fn new(filename: impl Into<String>, sidecar: SidecarState) -> Self {
        Self {
            filename: filename.into(),
            sidecar,
        }
    }
}

/// Lists `*.nii.gz` images under `func/`, `anat/` and `fmap/` with their sidecars
///
/// Missing modality folders are skipped. Images are sorted by name within
/// each folder.
pub fn collect_produced_files(subject_dir: &Path) -> Result<Vec<ProducedFile>> {
    let mut files = Vec::new();

    for modality in QC_MODALITIES {
        let dir = subject_dir.join(modality);
        if !dir.is_dir() {
            debug!("No {} directory in {}", modality, subject_dir.display());
            continue;
        }

        let mut images: Vec<_> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .map(|n| n.to_string_lossy().ends_with(".nii.gz"))
                        .unwrap_or(false)
            })
            .collect();
        images.sort();

        for image in images {
            let name = image
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let sidecar = match read_sidecar(&sidecar_path(&image)) {
                Ok(sidecar) => SidecarState::Present(sidecar),
                Err(BidsError::MissingInput(path)) => {
                    warn!("Missing sidecar {}", path.display());
                    SidecarState::Missing
                }
                Err(e) => {
                    warn!("Unreadable sidecar for {}: {}", image.display(), e);
                    SidecarState::Invalid(e.to_string())
                }
            };
            files.push(ProducedFile::new(strip_nifti_extension(&name), sidecar));
        }
    }

    Ok(files)
}

/// Verifies every produced file against the expected sequences
///
/// Always yields exactly one record per input file, in input order.
///
/// # Example
///
/// ```
/// use bidskit_core::{verify, ExpectedSeriesMap, ProducedFile, SequenceDefinition, SidecarState};
///
/// let mut expected = ExpectedSeriesMap::new();
/// expected.insert(3, SequenceDefinition::new("t1").with_literal("T1w MPRAGE"));
///
/// let files = vec![ProducedFile::new("sub-001_T1w", SidecarState::Missing)];
/// let records = verify(&expected, &files);
///
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].series_description.as_deref(), Some("Missing JSON"));
/// assert!(!records[0].passed());
/// ```
pub fn verify(expected: &ExpectedSeriesMap, produced_files: &[ProducedFile]) -> Vec<QcRecord> {
    produced_files
        .iter()
        .map(|file| verify_file(expected, file))
        .collect()
}

fn verify_file(expected: &ExpectedSeriesMap, file: &ProducedFile) -> QcRecord {
    let mut record = QcRecord::new(file.filename.clone());

    let metadata = match &file.sidecar {
        SidecarState::Present(metadata) => metadata,
        SidecarState::Missing => {
            record.series_description = Some(MISSING_JSON.to_string());
            return record;
        }
        SidecarState::Invalid(_) => {
            record.series_description = Some(INVALID_JSON.to_string());
            return record;
        }
    };

    let number = observed_number(metadata);
    let description = metadata
        .get("SeriesDescription")
        .and_then(Value::as_str)
        .map(str::to_string);
    record.acquisition_number = number;
    record.series_description = description.clone();

    let sequence = match number
        .and_then(|n| i32::try_from(n).ok())
        .and_then(|n| expected.get(&n))
    {
        Some(sequence) => sequence,
        None => {
            debug!("{}: acquisition {:?} is not expected", file.filename, number);
            return record;
        }
    };

    record.matched_sequence = QcFlag::True;
    record.sequence_type = sequence.name.clone();
    check_description(
        &mut record,
        sequence,
        description.as_deref().unwrap_or(""),
        &file.filename,
    );
    record
}

/// `AcquisitionNumber`, falling back to `SeriesNumber`; integer or numeric string
fn observed_number(metadata: &Sidecar) -> Option<i64> {
    ["AcquisitionNumber", "SeriesNumber"]
        .iter()
        .filter_map(|key| metadata.get(*key))
        .find_map(|value| match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
}

fn check_description(
    record: &mut QcRecord,
    sequence: &SequenceDefinition,
    description: &str,
    filename: &str,
) {
    let pattern = match &sequence.description_pattern {
        Some(pattern) => pattern,
        None => {
            let matched = match &sequence.description_literal {
                Some(literal) => description == literal,
                None => true,
            };
            record.matched = QcFlag::from_bool(matched);
            return;
        }
    };

    // Patterns are validated when the configuration is loaded
    let run = Regex::new(pattern)
        .ok()
        .and_then(|re| extract_run(&re, description));

    match run {
        Some(run) => {
            record.run_from_description = format_run(run);
            let run_matches = match &sequence.filename_template {
                Some(template) => filename.contains(&fill_int(template, "run", run)),
                None => filename_run(filename) == Some(run),
            };
            record.run_match_to_filename = QcFlag::from_bool(run_matches);
            record.matched = QcFlag::from_bool(run_matches);
        }
        None => {
            record.run_match_to_filename = QcFlag::False;
            record.matched = QcFlag::False;
        }
    }
}
