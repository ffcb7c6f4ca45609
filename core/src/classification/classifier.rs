use super::rules::RoleRules;
use crate::diagnostics::{Diagnostics, IssueKind};
use crate::types::RawSeriesRecord;
use log::{debug, info};
use std::collections::BTreeMap;

/// Series ids matched by each role
///
/// Every role from the rules is present, possibly with no series. Within a
/// role, series keep the order they were presented in (scan order), which
/// is what run numbering is derived from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassificationResult {
    roles: Vec<(String, Vec<String>)>,
}

impl ClassificationResult {
    /// Series ids assigned to a role, or `None` for a role that was not classified
    pub fn get(&self, role: &str) -> Option<&[String]> {
        self.roles
            .iter()
            .find(|(name, _)| name == role)
            .map(|(_, ids)| ids.as_slice())
    }

    /// Roles and their series, in rule order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.roles
            .iter()
            .map(|(name, ids)| (name.as_str(), ids.as_slice()))
    }

    pub fn role_names(&self) -> Vec<&str> {
        self.roles.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Total number of (role, series) assignments
    pub fn assignment_count(&self) -> usize {
        self.roles.iter().map(|(_, ids)| ids.len()).sum()
    }

    pub fn to_map(&self) -> BTreeMap<String, Vec<String>> {
        self.roles.iter().cloned().collect()
    }
}

/// Classifies series into roles
///
/// A series may satisfy several roles; it is added to each of them and the
/// overlap is recorded as a [`IssueKind::MultipleRoles`] diagnostic. Series
/// that match nothing, and required roles left empty, are recorded as
/// [`IssueKind::ClassificationMiss`].
///
/// # Example
///
/// ```
/// use bidskit_core::{classify, Diagnostics, MatchRule, RawSeriesRecord, RoleRule, RoleRules};
///
/// let rules = RoleRules::new(vec![
///     RoleRule::new("t1", MatchRule::SeriesNumbers(vec![3])),
///     RoleRule::new("test", MatchRule::Contains("test".to_string())),
/// ]);
/// let series = vec![RawSeriesRecord::new("s1", 3, "T1w MPRAGE")];
///
/// let mut diagnostics = Diagnostics::new();
/// let result = classify(&series, &rules, &mut diagnostics);
///
/// assert_eq!(result.get("t1"), Some(&["s1".to_string()][..]));
/// assert_eq!(result.get("test"), Some(&[][..]));
/// ```
pub fn classify(
    series: &[RawSeriesRecord],
    rules: &RoleRules,
    diagnostics: &mut Diagnostics,
) -> ClassificationResult {
    let mut roles: Vec<(String, Vec<String>)> = rules
        .roles()
        .iter()
        .map(|role| (role.name.clone(), Vec::new()))
        .collect();

    for record in series {
        let mut matched = Vec::new();
        for (role, (_, ids)) in rules.roles().iter().zip(roles.iter_mut()) {
            if role.rule.matches(record) {
                ids.push(record.series_id.clone());
                matched.push(role.name.as_str());
            }
        }

        match matched.len() {
            0 => diagnostics.record(
                IssueKind::ClassificationMiss,
                format!(
                    "series {} (#{} '{}') matched no role",
                    record.series_id, record.series_number, record.series_description
                ),
            ),
            1 => debug!("series {} -> {}", record.series_id, matched[0]),
            _ => diagnostics.record(
                IssueKind::MultipleRoles,
                format!(
                    "series {} ('{}') matched roles {}",
                    record.series_id,
                    record.series_description,
                    matched.join(", ")
                ),
            ),
        }
    }

    for (role, (_, ids)) in rules.roles().iter().zip(roles.iter()) {
        if role.required && ids.is_empty() {
            diagnostics.record(
                IssueKind::ClassificationMiss,
                format!("required sequence {} matched no series", role.name),
            );
        }
    }

    let result = ClassificationResult { roles };
    for (name, ids) in result.iter() {
        info!("  {}: {:?}", name, ids);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::rules::{MatchRule, RoleRule};
    use crate::config::SequenceConfig;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_input_has_every_role() {
        let rules = RoleRules::heuristic("amass");
        let mut diagnostics = Diagnostics::new();
        let result = classify(&[], &rules, &mut diagnostics);

        assert_eq!(result.role_names(), vec!["t1", "t2", "mt", "test", "pe1"]);
        for (_, ids) in result.iter() {
            assert!(ids.is_empty());
        }
        assert_eq!(result.assignment_count(), 0);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_series_number_end_to_end() {
        let config = SequenceConfig::from_json_str(
            r#"{
                "default_sequences": {
                    "t1": {"series_numbers": [3]},
                    "t2": {"series_numbers": [4]},
                    "test": {"series_numbers": [7, 9]}
                },
                "experiment_types": {"basic": ["t1", "t2", "test"]}
            }"#,
        )
        .unwrap();
        let rules = RoleRules::from_config(&config, "basic").unwrap();
        let series = vec![RawSeriesRecord::new("s1", 3, "T1w MPRAGE")];

        let mut diagnostics = Diagnostics::new();
        let result = classify(&series, &rules, &mut diagnostics);

        let mut expected = BTreeMap::new();
        expected.insert("t1".to_string(), ids(&["s1"]));
        expected.insert("t2".to_string(), vec![]);
        expected.insert("test".to_string(), vec![]);
        assert_eq!(result.to_map(), expected);
    }

    #[test]
    fn test_preserves_scan_order() {
        let rules = RoleRules::new(vec![RoleRule::new(
            "test",
            MatchRule::SeriesNumbers(vec![12, 7, 9]),
        )]);
        let series = vec![
            RawSeriesRecord::new("7-test", 7, "test_run1"),
            RawSeriesRecord::new("12-test", 12, "test_run3"),
            RawSeriesRecord::new("9-test", 9, "test_run2"),
        ];

        let mut diagnostics = Diagnostics::new();
        let result = classify(&series, &rules, &mut diagnostics);
        assert_eq!(
            result.get("test").unwrap(),
            ids(&["7-test", "12-test", "9-test"]).as_slice()
        );
    }

    #[test]
    fn test_multi_membership_is_kept_and_reported() {
        let rules = RoleRules::new(vec![
            RoleRule::new("t1", MatchRule::Contains("T1".to_string())),
            RoleRule::new("test", MatchRule::Contains("test".to_string())),
        ]);
        let series = vec![
            RawSeriesRecord::new("a", 2, "T1_test"),
            RawSeriesRecord::new("b", 3, "T1_test"),
        ];

        let mut diagnostics = Diagnostics::new();
        let result = classify(&series, &rules, &mut diagnostics);

        assert_eq!(result.get("t1").unwrap(), ids(&["a", "b"]).as_slice());
        assert_eq!(result.get("test").unwrap(), ids(&["a", "b"]).as_slice());
        assert_eq!(diagnostics.of_kind(&IssueKind::MultipleRoles).count(), 2);
    }

    #[test]
    fn test_literal_and_number_rules_both_match() {
        let rules = RoleRules::new(vec![
            RoleRule::new("anat", MatchRule::Contains("MPRAGE".to_string())),
            RoleRule::new("t1", MatchRule::SeriesNumbers(vec![3])),
        ]);
        let series = vec![RawSeriesRecord::new("s1", 3, "T1w MPRAGE")];

        let mut diagnostics = Diagnostics::new();
        let result = classify(&series, &rules, &mut diagnostics);
        assert_eq!(result.get("anat").unwrap(), ids(&["s1"]).as_slice());
        assert_eq!(result.get("t1").unwrap(), ids(&["s1"]).as_slice());
    }

    #[test]
    fn test_misses_are_reported() {
        let rules = RoleRules::new(vec![
            RoleRule::new("t1", MatchRule::SeriesNumbers(vec![3])).required(true),
            RoleRule::new("t2", MatchRule::SeriesNumbers(vec![4])),
        ]);
        let series = vec![RawSeriesRecord::new("loc", 1, "localizer")];

        let mut diagnostics = Diagnostics::new();
        let result = classify(&series, &rules, &mut diagnostics);

        assert_eq!(result.assignment_count(), 0);
        let misses: Vec<_> = diagnostics
            .of_kind(&IssueKind::ClassificationMiss)
            .map(|issue| issue.message.clone())
            .collect();
        assert_eq!(misses.len(), 2);
        assert!(misses[0].contains("localizer"));
        assert!(misses[1].contains("required sequence t1"));
    }

    #[test]
    fn test_idempotent() {
        let rules = RoleRules::heuristic("amass");
        let series = vec![
            RawSeriesRecord::new("1", 1, "T1w"),
            RawSeriesRecord::new("2", 2, "CAL_pe1"),
            RawSeriesRecord::new("3", 3, "test_run1"),
        ];

        let first = classify(&series, &rules, &mut Diagnostics::new());
        let second = classify(&series, &rules, &mut Diagnostics::new());
        assert_eq!(first, second);
    }
}
