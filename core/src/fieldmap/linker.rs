use super::layout::BidsLayout;
use crate::diagnostics::{Diagnostics, IssueKind};
use crate::error::{BidsError, Result};
use crate::sidecar::Sidecar;
use crate::types::{PhaseDirection, BOLD_DIRECTION, FIELDMAP_DIRECTIONS};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Run label → fieldmap id
pub type FieldmapRunMap = BTreeMap<String, String>;

/// Orders run labels numerically when both are integers, else lexically
pub fn compare_run_labels(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

/// Parses a `{"run": "fieldmap"}` JSON object
///
/// Numeric values are accepted and stringified.
pub fn parse_run_map(text: &str) -> Result<FieldmapRunMap> {
    let value: Value = serde_json::from_str(text)?;
    let object = value.as_object().ok_or_else(|| {
        BidsError::InvalidArgument("fieldmap mapping must be a JSON object".to_string())
    })?;

    object
        .iter()
        .map(|(run, fieldmap)| {
            let fieldmap = match fieldmap {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                other => {
                    return Err(BidsError::InvalidArgument(format!(
                        "fieldmap id for run {} must be a string, found {}",
                        run, other
                    )))
                }
            };
            Ok((run.clone(), fieldmap))
        })
        .collect()
}

/// One fieldmap and the functional runs it is intended for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldmapLink {
    pub fieldmap_id: String,
    /// Sorted run labels
    pub runs: Vec<String>,
}

impl FieldmapLink {
    /// Shared `B0FieldIdentifier` / `B0FieldSource` value
    pub fn field_identifier(&self) -> String {
        format!("phasediff_fmap{}", self.fieldmap_id)
    }

    /// `IntendedFor` entries for this fieldmap
    pub fn intended_for(&self, layout: &BidsLayout<'_>) -> Vec<String> {
        self.runs.iter().map(|run| layout.bold_uri(run)).collect()
    }
}

/// Groups functional runs by the fieldmap that corrects them
///
/// Runs that have no functional counterpart are dropped and recorded as
/// [`IssueKind::LinkageInconsistency`]. Fieldmaps left with no runs are
/// omitted. The output does not depend on the iteration order of the input.
///
/// # Example
///
/// ```
/// use bidskit_core::{link, Diagnostics, FieldmapRunMap};
/// use std::collections::BTreeSet;
///
/// let map: FieldmapRunMap = [("01", "1"), ("02", "1"), ("03", "2")]
///     .into_iter()
///     .map(|(r, f)| (r.to_string(), f.to_string()))
///     .collect();
/// let runs: BTreeSet<String> = ["01", "02", "03"].iter().map(|s| s.to_string()).collect();
///
/// let links = link(&map, &runs, &mut Diagnostics::new());
/// assert_eq!(links.len(), 2);
/// assert_eq!(links[0].runs, vec!["01", "02"]);
/// assert_eq!(links[1].runs, vec!["03"]);
/// ```
pub fn link(
    fieldmap_run_map: &FieldmapRunMap,
    functional_runs: &BTreeSet<String>,
    diagnostics: &mut Diagnostics,
) -> Vec<FieldmapLink> {
    let mut by_fieldmap: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for (run, fieldmap_id) in fieldmap_run_map {
        let runs = by_fieldmap.entry(fieldmap_id.as_str()).or_default();
        if functional_runs.contains(run) {
            runs.push(run.clone());
        } else {
            diagnostics.record(
                IssueKind::LinkageInconsistency,
                format!(
                    "run {} maps to fieldmap {} but has no functional BOLD file",
                    run, fieldmap_id
                ),
            );
        }
    }

    let mut links: Vec<FieldmapLink> = by_fieldmap
        .into_iter()
        .filter(|(_, runs)| !runs.is_empty())
        .map(|(fieldmap_id, mut runs)| {
            runs.sort_by(|a, b| compare_run_labels(a, b));
            FieldmapLink {
                fieldmap_id: fieldmap_id.to_string(),
                runs,
            }
        })
        .collect();
    links.sort_by(|a, b| compare_run_labels(&a.fieldmap_id, &b.fieldmap_id));
    links
}

/// Metadata written to one direction of a fieldmap
#[derive(Debug, Clone, PartialEq)]
pub struct FieldmapRecord {
    pub direction: PhaseDirection,
    pub fields: Sidecar,
}

/// Builds the two direction-specific fieldmap sidecar updates
///
/// Both records carry the same identifier and `IntendedFor`; only the
/// phase-encoding direction and polarity differ.
pub fn fieldmap_records(link: &FieldmapLink, layout: &BidsLayout<'_>) -> Vec<FieldmapRecord> {
    let identifier = link.field_identifier();
    let intended_for: Vec<Value> = link
        .intended_for(layout)
        .into_iter()
        .map(Value::String)
        .collect();

    FIELDMAP_DIRECTIONS
        .iter()
        .map(|&direction| {
            let mut fields = Sidecar::new();
            fields.insert("B0FieldIdentifier".into(), Value::String(identifier.clone()));
            fields.insert("IntendedFor".into(), Value::Array(intended_for.clone()));
            fields.insert(
                "PhaseEncodingDirection".into(),
                direction.encoding_direction().into(),
            );
            fields.insert("PhaseEncodingPolarityGE".into(), direction.polarity().into());
            fields.insert("TaskName".into(), layout.task.into());
            FieldmapRecord { direction, fields }
        })
        .collect()
}

/// Builds the sidecar update for a BOLD run corrected by `link`
pub fn bold_fields(link: &FieldmapLink, task: &str) -> Sidecar {
    let mut fields = Sidecar::new();
    fields.insert("B0FieldSource".into(), Value::String(link.field_identifier()));
    fields.insert(
        "PhaseEncodingDirection".into(),
        BOLD_DIRECTION.encoding_direction().into(),
    );
    fields.insert("PhaseEncodingPolarityGE".into(), BOLD_DIRECTION.polarity().into());
    fields.insert("TaskName".into(), task.into());
    fields
}
