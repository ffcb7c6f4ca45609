//! Placeholder substitution for filename and BIDS key templates
//!
//! Templates in the scan configuration use Python-style fields: `{run}`,
//! `{run:02d}`, `{subject}`, `{item:02d}`. Only plain and zero-padded
//! integer fields are understood; anything else is left untouched.

use regex::{Captures, Regex};
use std::sync::OnceLock;

fn field_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?::0?(?P<width>\d+)d)?\}")
            .expect("field regex is valid")
    })
}

/// Replaces every `{key}` / `{key:0Nd}` with the zero-padded integer
pub fn fill_int(template: &str, key: &str, value: u32) -> String {
    field_regex()
        .replace_all(template, |caps: &Captures| {
            if &caps["name"] != key {
                return caps[0].to_string();
            }
            match caps.name("width").and_then(|w| w.as_str().parse::<usize>().ok()) {
                Some(width) => format!("{:0width$}", value, width = width),
                None => value.to_string(),
            }
        })
        .into_owned()
}

/// Replaces every `{key}` with the given string
pub fn fill_str(template: &str, key: &str, value: &str) -> String {
    template.replace(&format!("{{{}}}", key), value)
}

/// Checks whether the template mentions `{key}` in any form
pub fn has_field(template: &str, key: &str) -> bool {
    field_regex()
        .captures_iter(template)
        .any(|caps| &caps["name"] == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("run-{run}", 3, "run-3")]
    #[case("run-{run:02d}", 3, "run-03")]
    #[case("run-{run:2d}", 3, "run-03")]
    #[case("task-x_run-{run:03d}_bold", 12, "task-x_run-012_bold")]
    #[case("no placeholder", 4, "no placeholder")]
    fn test_fill_int(#[case] template: &str, #[case] value: u32, #[case] expected: &str) {
        assert_eq!(fill_int(template, "run", value), expected);
    }

    #[test]
    fn test_fill_int_leaves_other_fields() {
        let out = fill_int("sub-{subject}_run-{item:02d}", "item", 1);
        assert_eq!(out, "sub-{subject}_run-01");
    }

    #[test]
    fn test_fill_str() {
        let out = fill_str("sub-{subject}/anat/sub-{subject}_T1w", "subject", "001");
        assert_eq!(out, "sub-001/anat/sub-001_T1w");
    }

    #[test]
    fn test_has_field() {
        assert!(has_field("run-{item:02d}", "item"));
        assert!(!has_field("sub-{subject}_T1w", "item"));
    }
}
