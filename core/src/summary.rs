//! Volume-check diagnostic summary
//!
//! Aggregates the per-scan diagnostic CSV (one row per subject/scan/run
//! with expected and actual volume counts) into a plain-text report that
//! lists the subjects needing review.

use crate::error::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the written summary
pub const SUMMARY_FILE_NAME: &str = "diagnostic_summary.txt";

const RULE: &str =
    "================================================================================";
const THIN_RULE: &str =
    "--------------------------------------------------------------------------------";

fn unknown() -> String {
    "UNKNOWN".to_string()
}

/// One row of the diagnostic CSV; absent columns read as `UNKNOWN`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiagnosticRow {
    #[serde(default = "unknown")]
    pub subject_id: String,
    #[serde(default = "unknown")]
    pub scan_type: String,
    #[serde(default = "unknown")]
    pub run_number: String,
    #[serde(default = "unknown")]
    pub expected_volumes: String,
    #[serde(default = "unknown")]
    pub actual_volumes: String,
    #[serde(default = "unknown")]
    pub status: String,
}

/// Per-subject counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectStats {
    pub total_checks: usize,
    pub errors: usize,
    pub ok: usize,
    pub issues: Vec<String>,
}

/// Aggregated view over all diagnostic rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticSummary {
    pub subjects: BTreeMap<String, SubjectStats>,
    pub issue_types: BTreeMap<String, usize>,
}

impl DiagnosticSummary {
    pub fn total_checks(&self) -> usize {
        self.subjects.values().map(|s| s.total_checks).sum()
    }

    pub fn total_errors(&self) -> usize {
        self.subjects.values().map(|s| s.errors).sum()
    }

    pub fn total_ok(&self) -> usize {
        self.subjects.values().map(|s| s.ok).sum()
    }

    /// Subjects with at least one ERROR row, sorted
    pub fn problematic_subjects(&self) -> Vec<&str> {
        self.subjects
            .iter()
            .filter(|(_, stats)| stats.errors > 0)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Subjects with no ERROR rows, sorted
    pub fn clean_subjects(&self) -> Vec<&str> {
        self.subjects
            .iter()
            .filter(|(_, stats)| stats.errors == 0)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    fn success_rate(&self) -> f64 {
        match self.total_checks() {
            0 => 0.0,
            total => self.total_ok() as f64 / total as f64 * 100.0,
        }
    }
}

/// Reads the diagnostic CSV (header row required)
pub fn load_diagnostics(path: &Path) -> Result<Vec<DiagnosticRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize::<DiagnosticRow>() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Aggregates rows per subject and per scan type
///
/// Statuses other than `OK` and `ERROR` count toward the total only.
pub fn summarize(rows: &[DiagnosticRow]) -> DiagnosticSummary {
    let mut summary = DiagnosticSummary::default();

    for row in rows {
        let stats = summary.subjects.entry(row.subject_id.clone()).or_default();
        stats.total_checks += 1;

        match row.status.as_str() {
            "ERROR" => {
                stats.errors += 1;
                stats.issues.push(format!(
                    "{} run-{}: expected {}, got {}",
                    row.scan_type, row.run_number, row.expected_volumes, row.actual_volumes
                ));
                *summary.issue_types.entry(row.scan_type.clone()).or_default() += 1;
            }
            "OK" => stats.ok += 1,
            _ => {}
        }
    }

    summary
}

/// Writes `diagnostic_summary.txt` into `output_dir`
pub fn write_summary(output_dir: &Path, summary: &DiagnosticSummary) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(SUMMARY_FILE_NAME);
    fs::write(&path, summary.to_string())?;
    Ok(path)
}

impl fmt::Display for DiagnosticSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(f, "FMRI DIAGNOSTIC SCAN VOLUME CHECK - SUMMARY REPORT")?;
        writeln!(f, "{}", RULE)?;
        writeln!(f)?;

        writeln!(f, "OVERALL STATISTICS")?;
        writeln!(f, "{}", THIN_RULE)?;
        writeln!(f, "Total Subjects Checked: {}", self.subjects.len())?;
        writeln!(f, "Total Checks Performed: {}", self.total_checks())?;
        writeln!(f, "Checks Passed (OK):     {}", self.total_ok())?;
        writeln!(f, "Checks Failed (ERROR):  {}", self.total_errors())?;
        writeln!(f, "Success Rate:           {:.1}%", self.success_rate())?;
        writeln!(f)?;

        if !self.issue_types.is_empty() {
            writeln!(f, "ISSUE BREAKDOWN BY SCAN TYPE")?;
            writeln!(f, "{}", THIN_RULE)?;
            for (scan_type, count) in &self.issue_types {
                writeln!(f, "{:<20}: {} errors", scan_type, count)?;
            }
            writeln!(f)?;
        }

        let problematic = self.problematic_subjects();
        if problematic.is_empty() {
            writeln!(f, "EXCELLENT! All subjects passed all checks.")?;
            writeln!(f)?;
        } else {
            writeln!(f, "PROBLEMATIC SUBJECTS REQUIRING REVIEW")?;
            writeln!(f, "{}", RULE)?;
            writeln!(f)?;
            for id in problematic {
                let stats = &self.subjects[id];
                writeln!(f, "Subject: {}", id)?;
                writeln!(f, "  Total Checks: {}", stats.total_checks)?;
                writeln!(f, "  Passed:       {}", stats.ok)?;
                writeln!(f, "  Failed:       {}", stats.errors)?;
                writeln!(f, "  Issues:")?;
                for issue in &stats.issues {
                    writeln!(f, "    - {}", issue)?;
                }
                writeln!(f)?;
            }
        }

        let clean = self.clean_subjects();
        if !clean.is_empty() {
            writeln!(f, "SUBJECTS WITH NO ERRORS")?;
            writeln!(f, "{}", THIN_RULE)?;
            for id in clean {
                let stats = &self.subjects[id];
                writeln!(f, "{}: {}/{} checks passed", id, stats.ok, stats.total_checks)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "{}", RULE)?;
        writeln!(f, "END OF SUMMARY REPORT")?;
        writeln!(f, "{}", RULE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CSV: &str = "subject_id,scan_type,run_number,expected_volumes,actual_volumes,status
sub-001,bold,01,210,210,OK
sub-001,bold,02,210,180,ERROR
sub-002,bold,01,210,210,OK
sub-002,fmap,01,3,3,OK
sub-003,fmap,01,3,1,ERROR
";

    fn rows() -> Vec<DiagnosticRow> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("diag.csv");
        fs::write(&path, CSV).unwrap();
        load_diagnostics(&path).unwrap()
    }

    #[test]
    fn test_summarize_counts() {
        let summary = summarize(&rows());

        assert_eq!(summary.total_checks(), 5);
        assert_eq!(summary.total_ok(), 3);
        assert_eq!(summary.total_errors(), 2);
        assert_eq!(summary.problematic_subjects(), vec!["sub-001", "sub-003"]);
        assert_eq!(summary.clean_subjects(), vec!["sub-002"]);
        assert_eq!(summary.issue_types["bold"], 1);
        assert_eq!(
            summary.subjects["sub-001"].issues,
            vec!["bold run-02: expected 210, got 180".to_string()]
        );
    }

    #[test]
    fn test_missing_columns_read_as_unknown() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("diag.csv");
        fs::write(&path, "subject_id,status\nsub-009,ERROR\n").unwrap();

        let rows = load_diagnostics(&path).unwrap();
        assert_eq!(rows[0].scan_type, "UNKNOWN");
        let summary = summarize(&rows);
        assert_eq!(
            summary.subjects["sub-009"].issues[0],
            "UNKNOWN run-UNKNOWN: expected UNKNOWN, got UNKNOWN"
        );
    }

    #[test]
    fn test_report_text() {
        let text = summarize(&rows()).to_string();
        assert!(text.contains("Success Rate:           60.0%"));
        assert!(text.contains("bold                : 1 errors"));
        assert!(text.contains("Subject: sub-003"));
        assert!(text.contains("sub-002: 2/2 checks passed"));
        assert!(!text.contains("EXCELLENT"));
    }

    #[test]
    fn test_all_clean_report() {
        let rows: Vec<_> = rows().into_iter().filter(|r| r.status == "OK").collect();
        let text = summarize(&rows).to_string();
        assert!(text.contains("EXCELLENT! All subjects passed all checks."));
    }

    #[test]
    fn test_write_summary() {
        let dir = TempDir::new().unwrap();
        let path = write_summary(&dir.path().join("out"), &summarize(&rows())).unwrap();
        assert!(path.ends_with(SUMMARY_FILE_NAME));
        assert!(fs::read_to_string(path).unwrap().starts_with(RULE));
    }
}
