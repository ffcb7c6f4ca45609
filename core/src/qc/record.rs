use serde::Serialize;
use std::fmt;

/// Series description recorded for images without a sidecar
pub const MISSING_JSON: &str = "Missing JSON";

/// Series description recorded for sidecars that could not be parsed
pub const INVALID_JSON: &str = "Invalid JSON";

/// Tri-state QC cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QcFlag {
    #[serde(rename = "TRUE")]
    True,
    #[serde(rename = "FALSE")]
    False,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl QcFlag {
    pub fn from_bool(value: bool) -> Self {
        if value {
            QcFlag::True
        } else {
            QcFlag::False
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, QcFlag::True)
    }
}

impl fmt::Display for QcFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QcFlag::True => "TRUE",
            QcFlag::False => "FALSE",
            QcFlag::NotApplicable => "N/A",
        };
        write!(f, "{}", s)
    }
}

/// One QC report row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct QcRecord {
    /// Image file name without `.nii.gz`
    pub filename: String,
    pub acquisition_number: Option<i64>,
    pub series_description: Option<String>,
    pub matched_sequence: QcFlag,
    pub sequence_type: String,
    #[serde(rename = "Match")]
    pub matched: QcFlag,
    pub run_from_description: String,
    pub run_match_to_filename: QcFlag,
}

impl QcRecord {
    /// A failing record with nothing observed yet
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            acquisition_number: None,
            series_description: None,
            matched_sequence: QcFlag::False,
            sequence_type: String::new(),
            matched: QcFlag::False,
            run_from_description: String::new(),
            run_match_to_filename: QcFlag::NotApplicable,
        }
    }

    /// Whether the file was classified and named as expected
    pub fn passed(&self) -> bool {
        self.matched_sequence.is_true() && self.matched.is_true()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_fails() {
        let record = QcRecord::new("sub-001_T1w");
        assert!(!record.passed());
        assert_eq!(record.run_match_to_filename, QcFlag::NotApplicable);
    }

    #[test]
    fn test_flag_display() {
        assert_eq!(QcFlag::from_bool(true).to_string(), "TRUE");
        assert_eq!(QcFlag::from_bool(false).to_string(), "FALSE");
        assert_eq!(QcFlag::NotApplicable.to_string(), "N/A");
    }
}
