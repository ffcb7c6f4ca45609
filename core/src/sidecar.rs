//! BIDS JSON sidecar reading and writing
//!
//! Sidecars are written with top-level keys sorted alphabetically and a
//! two-space indent, so rewriting a file only changes what was updated.

use crate::error::{BidsError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level object of a sidecar file
pub type Sidecar = Map<String, Value>;

const NIFTI_GZ: &str = ".nii.gz";
const NIFTI: &str = ".nii";

/// Returns the sidecar path for an image (`x.nii.gz` → `x.json`)
pub fn sidecar_path(image: &Path) -> PathBuf {
    let name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = strip_nifti_extension(&name);
    image.with_file_name(format!("{}.json", stem))
}

/// Strips `.nii.gz` or `.nii` from a file name
pub fn strip_nifti_extension(name: &str) -> &str {
    name.strip_suffix(NIFTI_GZ)
        .or_else(|| name.strip_suffix(NIFTI))
        .unwrap_or(name)
}

/// Reads a sidecar object
///
/// # Errors
///
/// `MissingInput` if the file does not exist, `JsonError` if it is not a
/// JSON object.
pub fn read_sidecar(path: &Path) -> Result<Sidecar> {
    if !path.exists() {
        return Err(BidsError::MissingInput(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&text)? {
        Value::Object(map) => Ok(map),
        other => Err(BidsError::InvalidArgument(format!(
            "{} holds {} instead of an object",
            path.display(),
            json_kind(&other)
        ))),
    }
}

/// Serializes a sidecar with sorted top-level keys
pub fn to_sorted_string(sidecar: &Sidecar) -> Result<String> {
    let sorted: BTreeMap<&String, &Value> = sidecar.iter().collect();
    Ok(serde_json::to_string_pretty(&sorted)?)
}

/// Writes a sidecar with sorted top-level keys
pub fn write_sidecar(path: &Path, sidecar: &Sidecar) -> Result<()> {
    fs::write(path, to_sorted_string(sidecar)?)?;
    Ok(())
}

/// Merges `updates` into the sidecar at `path` and rewrites it
pub fn update_sidecar(path: &Path, updates: &Sidecar) -> Result<Sidecar> {
    let mut sidecar = read_sidecar(path)?;
    for (key, value) in updates {
        sidecar.insert(key.clone(), value.clone());
    }
    write_sidecar(path, &sidecar)?;
    Ok(sidecar)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
