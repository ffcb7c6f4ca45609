use crate::config::SequenceConfig;
use crate::error::Result;
use crate::types::{RawSeriesRecord, SequenceDefinition};
use log::{debug, warn};
use regex::Regex;

/// How a role decides whether a series belongs to it
#[derive(Debug, Clone)]
pub enum MatchRule {
    /// Series description contains the substring (case-sensitive)
    Contains(String),
    /// Series description matches the regex anywhere
    Pattern(Regex),
    /// Series number is in the allow-list
    SeriesNumbers(Vec<i32>),
}

impl MatchRule {
    /// Derives the rule for a configured sequence
    ///
    /// Configured series numbers take priority, so `--series` overrides
    /// always apply. A sequence without numbers falls back to its literal
    /// description, then its description pattern.
    pub fn from_definition(def: &SequenceDefinition) -> Result<Self> {
        if !def.series_numbers.is_empty() {
            return Ok(MatchRule::SeriesNumbers(def.series_numbers.clone()));
        }
        if let Some(literal) = &def.description_literal {
            return Ok(MatchRule::Contains(literal.clone()));
        }
        if let Some(pattern) = &def.description_pattern {
            return Ok(MatchRule::Pattern(Regex::new(pattern)?));
        }
        Ok(MatchRule::SeriesNumbers(Vec::new()))
    }

    pub fn matches(&self, series: &RawSeriesRecord) -> bool {
        match self {
            MatchRule::Contains(needle) => series.series_description.contains(needle.as_str()),
            MatchRule::Pattern(re) => re.is_match(&series.series_description),
            MatchRule::SeriesNumbers(numbers) => numbers.contains(&series.series_number),
        }
    }
}

/// One classification role
#[derive(Debug, Clone)]
pub struct RoleRule {
    pub name: String,
    pub rule: MatchRule,
    /// A required role that matches nothing is reported
    pub required: bool,
    /// BIDS key template with `{subject}` and `{item}` placeholders
    pub bids_template: Option<String>,
}

impl RoleRule {
    pub fn new(name: impl Into<String>, rule: MatchRule) -> Self {
        Self {
            name: name.into(),
            rule,
            required: false,
            bids_template: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.bids_template = Some(template.into());
        self
    }
}

/// Ordered set of roles used for one classification pass
#[derive(Debug, Clone, Default)]
pub struct RoleRules {
    roles: Vec<RoleRule>,
}

impl RoleRules {
    pub fn new(roles: Vec<RoleRule>) -> Self {
        Self { roles }
    }

    /// Builds roles for the sequences of one experiment type
    ///
    /// Sequence names the configuration does not define still become roles,
    /// with an empty series-number list, so they classify nothing.
    pub fn from_config(config: &SequenceConfig, experiment_type: &str) -> Result<Self> {
        let experiment = config.get_experiment(experiment_type);
        let mut roles = Vec::with_capacity(experiment.sequence_names.len());

        for name in &experiment.sequence_names {
            let lookup = config.get_sequence(name);
            if lookup.is_unknown() {
                warn!(
                    "Experiment '{}' lists unconfigured sequence '{}'",
                    experiment.name, name
                );
            }
            let def = lookup.definition();
            let rule = MatchRule::from_definition(def)?;
            debug!("Role {} uses {:?}", name, rule);

            let mut role = RoleRule::new(name.clone(), rule).required(def.required);
            role.bids_template = def.bids_template.clone();
            roles.push(role);
        }

        Ok(Self { roles })
    }

    /// Built-in description-substring heuristic
    ///
    /// T1 → T1w, T2 → inplaneT2, Xing2018 → mt-lc, test → task BOLD,
    /// CAL → AP fieldmap.
    pub fn heuristic(task_id: &str) -> Self {
        let contains = |s: &str| MatchRule::Contains(s.to_string());
        Self::new(vec![
            RoleRule::new("t1", contains("T1"))
                .with_template("sub-{subject}/anat/sub-{subject}_T1w"),
            RoleRule::new("t2", contains("T2"))
                .with_template("sub-{subject}/anat/sub-{subject}_inplaneT2"),
            RoleRule::new("mt", contains("Xing2018"))
                .with_template("sub-{subject}/anat/sub-{subject}_mt-lc"),
            RoleRule::new("test", contains("test")).with_template(format!(
                "sub-{{subject}}/func/sub-{{subject}}_task-{}_run-{{item:02d}}_dir-PA_bold",
                task_id
            )),
            RoleRule::new("pe1", contains("CAL"))
                .with_template("sub-{subject}/fmap/sub-{subject}_run-{item:02d}_dir-AP_epi"),
        ])
    }

    pub fn roles(&self) -> &[RoleRule] {
        &self.roles
    }

    pub fn get(&self, name: &str) -> Option<&RoleRule> {
        self.roles.iter().find(|role| role.name == name)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
