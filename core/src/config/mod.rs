//! Scan configuration store
//!
//! Loads the `default_sequences` / `experiment_types` JSON document that
//! describes which scanner series belong to which logical sequence, and which
//! sequences each experiment type includes.
//!
//! # Example
//!
//! ```
//! use bidskit_core::SequenceConfig;
//!
//! let config = SequenceConfig::from_json_str(r#"{
//!     "default_sequences": {
//!         "t1": {"series_numbers": [3], "required": true, "description": "T1w"}
//!     },
//!     "experiment_types": {"basic": ["t1"]}
//! }"#).unwrap();
//!
//! assert_eq!(config.series_numbers("t1"), &[3]);
//! assert!(config.get_sequence("dwi").is_unknown());
//! assert_eq!(config.get_experiment("nope").name, "basic");
//! ```

use crate::error::{BidsError, Result};
use crate::types::{ExperimentType, SequenceDefinition};
use log::{debug, info, warn};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Name of the experiment type every configuration must define
pub const BASIC_EXPERIMENT: &str = "basic";

const SEQUENCES_KEY: &str = "default_sequences";
const EXPERIMENTS_KEY: &str = "experiment_types";

/// Per-invocation replacement series numbers, keyed by sequence name
pub type SeriesOverrides = BTreeMap<String, Vec<i32>>;

/// Expected sequence for every configured series number
pub type ExpectedSeriesMap = BTreeMap<i32, SequenceDefinition>;

/// Result of looking up a sequence by name
///
/// Unknown names do not fail; they yield a synthesized, non-required
/// definition with no series numbers. The variant keeps the fact that it was
/// synthesized inspectable.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceLookup<'a> {
    Configured(&'a SequenceDefinition),
    Unknown(SequenceDefinition),
}

impl SequenceLookup<'_> {
    pub fn definition(&self) -> &SequenceDefinition {
        match self {
            SequenceLookup::Configured(def) => def,
            SequenceLookup::Unknown(def) => def,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SequenceLookup::Unknown(_))
    }
}

/// Immutable-after-load scan configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceConfig {
    sequences: Vec<SequenceDefinition>,
    experiments: Vec<ExperimentType>,
}

impl SequenceConfig {
    /// Builds a store from already-parsed parts
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no `basic` experiment is present, a name is
    /// duplicated, or a description pattern does not compile.
    pub fn new(sequences: Vec<SequenceDefinition>, experiments: Vec<ExperimentType>) -> Result<Self> {
        for (i, def) in sequences.iter().enumerate() {
            if sequences[..i].iter().any(|other| other.name == def.name) {
                return Err(BidsError::ConfigError(format!(
                    "duplicate sequence '{}'",
                    def.name
                )));
            }
            if let Some(pattern) = &def.description_pattern {
                Regex::new(pattern).map_err(|e| {
                    BidsError::ConfigError(format!(
                        "sequence '{}' has an invalid series_description_pattern: {}",
                        def.name, e
                    ))
                })?;
            }
        }

        if !experiments.iter().any(|exp| exp.name == BASIC_EXPERIMENT) {
            return Err(BidsError::ConfigError(format!(
                "{} must define a '{}' experiment",
                EXPERIMENTS_KEY, BASIC_EXPERIMENT
            )));
        }

        Ok(Self {
            sequences,
            experiments,
        })
    }

    /// Loads the configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            BidsError::ConfigError(format!(
                "cannot read scan configuration {}: {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_json_str(&text)?;
        info!("Loaded scan configuration from {}", path.display());
        Ok(config)
    }

    /// Parses the configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| BidsError::ConfigError(format!("invalid JSON: {}", e)))?;
        let root = root
            .as_object()
            .ok_or_else(|| BidsError::ConfigError("top level must be an object".to_string()))?;

        let sequences = parse_sequences(required_object(root, SEQUENCES_KEY)?)?;
        let experiments = parse_experiments(required_object(root, EXPERIMENTS_KEY)?)?;

        Self::new(sequences, experiments)
    }

    /// Looks up a configured sequence
    pub fn find_sequence(&self, name: &str) -> Option<&SequenceDefinition> {
        self.sequences.iter().find(|def| def.name == name)
    }

    /// Looks up a sequence, synthesizing an unknown placeholder if needed
    pub fn get_sequence(&self, name: &str) -> SequenceLookup<'_> {
        match self.find_sequence(name) {
            Some(def) => SequenceLookup::Configured(def),
            None => SequenceLookup::Unknown(SequenceDefinition::unknown(name)),
        }
    }

    /// Returns the experiment preset, falling back to `basic`
    pub fn get_experiment(&self, type_name: &str) -> &ExperimentType {
        if let Some(exp) = self.find_experiment(type_name) {
            return exp;
        }
        warn!(
            "Unknown experiment type: {}, falling back to '{}'",
            type_name, BASIC_EXPERIMENT
        );
        self.basic_experiment()
    }

    fn find_experiment(&self, type_name: &str) -> Option<&ExperimentType> {
        self.experiments.iter().find(|exp| exp.name == type_name)
    }

    fn basic_experiment(&self) -> &ExperimentType {
        // `new` rejects configurations without a basic experiment
        &self.experiments[self
            .experiments
            .iter()
            .position(|exp| exp.name == BASIC_EXPERIMENT)
            .unwrap_or(0)]
    }

    /// Replaces `series_numbers` for every overridden name present in the store
    ///
    /// Names that are not configured are ignored.
    pub fn apply_overrides(&mut self, overrides: &SeriesOverrides) {
        for (name, series_numbers) in overrides {
            match self.sequences.iter_mut().find(|def| &def.name == name) {
                Some(def) => {
                    def.series_numbers = series_numbers.clone();
                    info!("Applied override for {}: {:?}", name, series_numbers);
                }
                None => debug!("Ignoring override for unconfigured sequence {}", name),
            }
        }
    }

    pub fn series_numbers(&self, name: &str) -> &[i32] {
        self.find_sequence(name)
            .map(|def| def.series_numbers.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.find_sequence(name).map(|def| def.required).unwrap_or(false)
    }

    /// All configured sequences, in file order
    pub fn sequences(&self) -> &[SequenceDefinition] {
        &self.sequences
    }

    pub fn experiments(&self) -> &[ExperimentType] {
        &self.experiments
    }

    pub fn sequence_names(&self) -> Vec<&str> {
        self.sequences.iter().map(|def| def.name.as_str()).collect()
    }

    pub fn experiment_names(&self) -> Vec<&str> {
        self.experiments.iter().map(|exp| exp.name.as_str()).collect()
    }

    /// Maps each configured series number to the sequence that claims it
    ///
    /// When two sequences list the same number, the later one wins.
    pub fn expected_by_series_number(&self) -> ExpectedSeriesMap {
        let mut mapping = ExpectedSeriesMap::new();
        for def in &self.sequences {
            for &number in &def.series_numbers {
                if let Some(previous) = mapping.insert(number, def.clone()) {
                    warn!(
                        "Series {} claimed by both {} and {}",
                        number, previous.name, def.name
                    );
                }
            }
        }
        mapping
    }

    /// Logs the configuration summary at info level
    pub fn log_summary(&self) {
        info!("Current Configuration Summary:");
        info!("Available sequences:");
        for def in &self.sequences {
            info!("  - {}", def);
            info!("    Series: {:?}", def.series_numbers);
        }
        info!("Available experiment types:");
        for exp in &self.experiments {
            info!("  - {}: {}", exp.name, exp.sequence_names.join(", "));
        }
    }
}

fn required_object<'a>(root: &'a Map<String, Value>, key: &str) -> Result<&'a Map<String, Value>> {
    root.get(key)
        .ok_or_else(|| BidsError::ConfigError(format!("missing required key '{}'", key)))?
        .as_object()
        .ok_or_else(|| BidsError::ConfigError(format!("'{}' must be an object", key)))
}

fn parse_sequences(table: &Map<String, Value>) -> Result<Vec<SequenceDefinition>> {
    table
        .iter()
        .map(|(name, value)| {
            let mut def: SequenceDefinition = serde_json::from_value(value.clone())
                .map_err(|e| BidsError::ConfigError(format!("sequence '{}': {}", name, e)))?;
            def.name = name.clone();
            Ok(def)
        })
        .collect()
}

fn parse_experiments(table: &Map<String, Value>) -> Result<Vec<ExperimentType>> {
    table
        .iter()
        .map(|(name, value)| {
            let sequence_names: Vec<String> = serde_json::from_value(value.clone())
                .map_err(|e| BidsError::ConfigError(format!("experiment '{}': {}", name, e)))?;
            Ok(ExperimentType::new(name.clone(), sequence_names))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "default_sequences": {
            "t1": {"series_numbers": [3], "required": true, "description": "T1-weighted MPRAGE"},
            "t2": {"series_numbers": [4], "required": false, "description": "Inplane T2"},
            "test": {
                "series_numbers": [7, 9],
                "required": true,
                "description": "Task BOLD",
                "series_description_pattern": "test_run(?P<run>\\d+)",
                "filename_template": "run-{run:02d}"
            },
            "pe1": {"series_numbers": [6, 8], "description": "Fieldmap"}
        },
        "experiment_types": {
            "basic": ["t1", "test", "pe1"],
            "full": ["t1", "t2", "test", "pe1"]
        }
    }"#;

    fn sample() -> SequenceConfig {
        SequenceConfig::from_json_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = SequenceConfig::load(file.path()).unwrap();
        assert_eq!(config.sequence_names(), vec!["t1", "t2", "test", "pe1"]);
        assert_eq!(config.experiment_names(), vec!["basic", "full"]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SequenceConfig::load(Path::new("/nonexistent/scan-config.json")).unwrap_err();
        assert!(matches!(err, BidsError::ConfigError(_)));
    }

    #[test]
    fn test_invalid_json() {
        let err = SequenceConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, BidsError::ConfigError(_)));
    }

    #[test]
    fn test_missing_top_level_keys() {
        let err = SequenceConfig::from_json_str(r#"{"experiment_types": {"basic": []}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("default_sequences"));

        let err = SequenceConfig::from_json_str(r#"{"default_sequences": {}}"#).unwrap_err();
        assert!(err.to_string().contains("experiment_types"));
    }

    #[test]
    fn test_basic_experiment_required() {
        let err = SequenceConfig::from_json_str(
            r#"{"default_sequences": {}, "experiment_types": {"full": []}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("basic"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = SequenceConfig::from_json_str(
            r#"{
                "default_sequences": {"test": {"series_description_pattern": "run(?P<run>"}},
                "experiment_types": {"basic": ["test"]}
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, BidsError::ConfigError(_)));
    }

    #[test]
    fn test_get_sequence_known_and_unknown() {
        let config = sample();

        let t1 = config.get_sequence("t1");
        assert!(!t1.is_unknown());
        assert_eq!(t1.definition().series_numbers, vec![3]);

        let dwi = config.get_sequence("dwi");
        assert!(dwi.is_unknown());
        assert!(dwi.definition().series_numbers.is_empty());
        assert!(!dwi.definition().required);
        assert_eq!(dwi.definition().description, "Unknown sequence");
    }

    #[test]
    fn test_get_experiment_fallback() {
        let config = sample();
        assert_eq!(config.get_experiment("full").sequence_names.len(), 4);
        assert_eq!(config.get_experiment("missing").name, BASIC_EXPERIMENT);
        assert_eq!(config.get_experiment(BASIC_EXPERIMENT).name, BASIC_EXPERIMENT);
    }

    #[test]
    fn test_apply_overrides_replaces() {
        let mut config = sample();
        let mut overrides = SeriesOverrides::new();
        overrides.insert("test".to_string(), vec![11, 12, 13]);

        config.apply_overrides(&overrides);
        assert_eq!(config.series_numbers("test"), &[11, 12, 13]);
        assert_eq!(config.series_numbers("t1"), &[3]);
    }

    #[test]
    fn test_apply_overrides_unknown_name_is_noop() {
        let mut config = sample();
        let before = config.clone();
        let mut overrides = SeriesOverrides::new();
        overrides.insert("dwi".to_string(), vec![20]);

        config.apply_overrides(&overrides);
        assert_eq!(config, before);
    }

    #[test]
    fn test_accessors() {
        let config = sample();
        assert!(config.is_required("t1"));
        assert!(!config.is_required("pe1"));
        assert!(!config.is_required("nope"));
        assert!(config.series_numbers("nope").is_empty());
    }

    #[test]
    fn test_expected_by_series_number() {
        let config = sample();
        let expected = config.expected_by_series_number();
        assert_eq!(expected.len(), 6);
        assert_eq!(expected[&7].name, "test");
        assert_eq!(expected[&8].name, "pe1");
        assert!(!expected.contains_key(&5));
    }
}
