use serde::{Deserialize, Serialize};
use std::fmt;

/// Description text used for sequences that are not in the configuration
pub const UNKNOWN_SEQUENCE_DESCRIPTION: &str = "Unknown sequence";

/// One logical sequence from the `default_sequences` configuration table
///
/// The `name` is the table key and is filled in after deserialization.
/// At most one of `description_pattern` and `description_literal` is
/// expected to be set; when both are, the literal wins for classification
/// and the pattern wins for QC.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SequenceDefinition {
    #[serde(skip)]
    pub name: String,

    /// Scanner series numbers assigned to this sequence
    #[serde(default)]
    pub series_numbers: Vec<i32>,

    /// Regex applied to the series description, with a named `run` group
    #[serde(
        rename = "series_description_pattern",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description_pattern: Option<String>,

    /// Expected series description
    #[serde(
        rename = "series_description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description_literal: Option<String>,

    /// Filename fragment containing a `{run}` placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename_template: Option<String>,

    /// BIDS key template with `{subject}` and `{item}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bids_template: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub description: String,
}

impl SequenceDefinition {
    /// Creates an empty, optional definition with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The placeholder returned for names missing from the configuration
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: UNKNOWN_SEQUENCE_DESCRIPTION.to_string(),
            ..Self::default()
        }
    }

    pub fn with_series_numbers(mut self, series_numbers: Vec<i32>) -> Self {
        self.series_numbers = series_numbers;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.description_pattern = Some(pattern.into());
        self
    }

    pub fn with_literal(mut self, literal: impl Into<String>) -> Self {
        self.description_literal = Some(literal.into());
        self
    }

    pub fn with_filename_template(mut self, template: impl Into<String>) -> Self {
        self.filename_template = Some(template.into());
        self
    }

    pub fn with_bids_template(mut self, template: impl Into<String>) -> Self {
        self.bids_template = Some(template.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Returns "Required" or "Optional" for summaries
    pub fn requirement_label(&self) -> &'static str {
        if self.required {
            "Required"
        } else {
            "Optional"
        }
    }
}

impl fmt::Display for SequenceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = if self.description.is_empty() {
            "No description"
        } else {
            self.description.as_str()
        };
        write!(
            f,
            "{} ({}): {}",
            self.name,
            self.requirement_label(),
            description
        )
    }
}

/// Named preset listing the sequences an experiment includes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentType {
    pub name: String,
    pub sequence_names: Vec<String>,
}

impl ExperimentType {
    pub fn new(name: impl Into<String>, sequence_names: Vec<String>) -> Self {
        Self {
            name: name.into(),
            sequence_names,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_config_keys() {
        let json = r#"{
            "series_numbers": [5, 6],
            "required": true,
            "description": "Task BOLD",
            "series_description_pattern": "run(?P<run>\\d+)",
            "filename_template": "run-{run:02d}"
        }"#;

        let def: SequenceDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.series_numbers, vec![5, 6]);
        assert!(def.required);
        assert_eq!(def.description_pattern.as_deref(), Some("run(?P<run>\\d+)"));
        assert_eq!(def.filename_template.as_deref(), Some("run-{run:02d}"));
        assert!(def.description_literal.is_none());
        assert!(def.name.is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let def: SequenceDefinition = serde_json::from_str("{}").unwrap();
        assert!(def.series_numbers.is_empty());
        assert!(!def.required);
        assert_eq!(def.description, "");
    }

    #[test]
    fn test_unknown_sentinel() {
        let def = SequenceDefinition::unknown("dwi");
        assert_eq!(def.name, "dwi");
        assert!(def.series_numbers.is_empty());
        assert!(!def.required);
        assert_eq!(def.description, UNKNOWN_SEQUENCE_DESCRIPTION);
    }

    #[test]
    fn test_display() {
        let def = SequenceDefinition::new("t1").required(true);
        assert_eq!(def.to_string(), "t1 (Required): No description");
    }
}
