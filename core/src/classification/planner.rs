use super::classifier::ClassificationResult;
use super::rules::RoleRules;
use crate::template::{fill_int, fill_str, has_field};
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// BIDS destination for one classified series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedOutput {
    pub series_id: String,
    pub role: String,
    /// Key relative to the BIDS root, without extension
    pub key: String,
}

impl PlannedOutput {
    pub fn nifti_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.nii.gz", self.key))
    }

    pub fn sidecar_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.json", self.key))
    }
}

/// Renders the BIDS key for every classified series
///
/// `{item}` is the 1-based position of the series within its role, so the
/// first functional run becomes `run-01`. Roles without a template are
/// skipped.
pub fn plan_outputs(
    result: &ClassificationResult,
    rules: &RoleRules,
    subject: &str,
) -> Vec<PlannedOutput> {
    let mut outputs = Vec::new();
    let mut seen = HashSet::new();

    for (role_name, series_ids) in result.iter() {
        let template = match rules.get(role_name).and_then(|r| r.bids_template.as_deref()) {
            Some(template) => template,
            None => {
                debug!("No BIDS template for {}, skipping", role_name);
                continue;
            }
        };

        if series_ids.len() > 1 && !has_field(template, "item") {
            warn!(
                "{} matched {} series but its template has no {{item}} field",
                role_name,
                series_ids.len()
            );
        }

        for (index, series_id) in series_ids.iter().enumerate() {
            let key = fill_int(&fill_str(template, "subject", subject), "item", index as u32 + 1);
            if !seen.insert(key.clone()) {
                warn!("{} is planned more than once (series {})", key, series_id);
            }
            outputs.push(PlannedOutput {
                series_id: series_id.clone(),
                role: role_name.to_string(),
                key,
            });
        }
    }

    outputs
}
