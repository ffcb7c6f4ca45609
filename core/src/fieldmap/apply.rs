use super::layout::BidsLayout;
use super::linker::{bold_fields, fieldmap_records, FieldmapLink};
use crate::diagnostics::{Diagnostics, IssueKind};
use crate::error::{BidsError, Result};
use crate::sidecar::{update_sidecar, Sidecar};
use log::info;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Counts of sidecars rewritten by [`apply_to_dataset`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkSummary {
    pub fieldmaps_updated: usize,
    pub bolds_updated: usize,
    pub skipped: usize,
}

/// Finds the BOLD runs present on disk for a subject and task
///
/// Looks for `sub-S_task-T_run-R_dir-PA_bold.nii.gz` under `func/`. A
/// missing `func/` directory yields an empty set.
pub fn discover_functional_runs(layout: &BidsLayout<'_>) -> Result<BTreeSet<String>> {
    let func_dir = layout.subject_dir().join("func");
    let mut runs = BTreeSet::new();
    if !func_dir.is_dir() {
        return Ok(runs);
    }

    let pattern = format!(
        r"^sub-{}_task-{}_run-(?P<run>[^_]+)_dir-PA_bold\.nii\.gz$",
        regex::escape(layout.subject),
        regex::escape(layout.task)
    );
    let re = Regex::new(&pattern)?;

    for entry in fs::read_dir(&func_dir)? {
        let name = entry?.file_name();
        if let Some(caps) = re.captures(&name.to_string_lossy()) {
            runs.insert(caps["run"].to_string());
        }
    }
    Ok(runs)
}

/// Writes fieldmap and BOLD linkage metadata into the dataset
///
/// Every fieldmap direction and every linked BOLD sidecar is updated
/// independently: a missing or unreadable file is recorded in
/// `diagnostics` and the rest are still written.
pub fn apply_to_dataset(
    layout: &BidsLayout<'_>,
    links: &[FieldmapLink],
    diagnostics: &mut Diagnostics,
) -> LinkSummary {
    let mut summary = LinkSummary::default();

    for link in links {
        for record in fieldmap_records(link, layout) {
            let path = layout.fieldmap_sidecar(&link.fieldmap_id, record.direction);
            if apply_update(&path, &record.fields, diagnostics) {
                info!(
                    "Updated {} fieldmap metadata for fieldmap {}",
                    record.direction, link.fieldmap_id
                );
                summary.fieldmaps_updated += 1;
            } else {
                summary.skipped += 1;
            }
        }

        let fields = bold_fields(link, layout.task);
        for run in &link.runs {
            let path = layout.bold_sidecar(run);
            if apply_update(&path, &fields, diagnostics) {
                info!("Updated BOLD metadata for run {}", run);
                summary.bolds_updated += 1;
            } else {
                summary.skipped += 1;
            }
        }
    }

    summary
}

fn apply_update(path: &Path, fields: &Sidecar, diagnostics: &mut Diagnostics) -> bool {
    match update_sidecar(path, fields) {
        Ok(_) => true,
        Err(BidsError::MissingInput(missing)) => {
            diagnostics.record_path(IssueKind::MissingInput, "sidecar not found", missing);
            false
        }
        Err(e) => {
            diagnostics.record_path(
                IssueKind::MissingInput,
                format!("sidecar could not be updated: {}", e),
                path.to_path_buf(),
            );
            false
        }
    }
}
