use crate::classification::{ClassificationResult, PlannedOutput};
use crate::config::SequenceConfig;
use crate::diagnostics::Diagnostics;
use crate::fieldmap::{FieldmapLink, LinkSummary};
use crate::qc::QcRecord;
use std::fmt;

/// Text report of role assignments
pub struct ClassificationReport<'a> {
    result: &'a ClassificationResult,
}

impl<'a> ClassificationReport<'a> {
    pub fn new(result: &'a ClassificationResult) -> Self {
        Self { result }
    }
}

impl<'a> fmt::Display for ClassificationReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Series Classification")?;
        writeln!(f, "=====================")?;
        writeln!(f)?;
        for (role, series_ids) in self.result.iter() {
            if series_ids.is_empty() {
                writeln!(f, "{:<16} (none)", format!("{}:", role))?;
            } else {
                writeln!(f, "{:<16} {}", format!("{}:", role), series_ids.join(", "))?;
            }
        }
        writeln!(f)?;
        write!(f, "Assignments:     {}", self.result.assignment_count())
    }
}

/// Planned BIDS destinations, one per line
pub struct PlanReport<'a> {
    outputs: &'a [PlannedOutput],
}

impl<'a> PlanReport<'a> {
    pub fn new(outputs: &'a [PlannedOutput]) -> Self {
        Self { outputs }
    }
}

impl<'a> fmt::Display for PlanReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for output in self.outputs {
            writeln!(
                f,
                "{} [{}] -> {}",
                output.series_id,
                output.role,
                output.nifti_path().display()
            )?;
        }
        Ok(())
    }
}

/// Sequences and experiment types of a loaded configuration
pub struct ConfigReport<'a> {
    config: &'a SequenceConfig,
}

impl<'a> ConfigReport<'a> {
    pub fn new(config: &'a SequenceConfig) -> Self {
        Self { config }
    }
}

impl<'a> fmt::Display for ConfigReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current Configuration Summary:")?;
        writeln!(f, "Available sequences:")?;
        for def in self.config.sequences() {
            writeln!(f, "  - {}", def)?;
            writeln!(f, "    Series: {:?}", def.series_numbers)?;
            if let Some(pattern) = &def.description_pattern {
                writeln!(f, "    Pattern: {}", pattern)?;
            }
        }
        writeln!(f, "Available experiment types:")?;
        for exp in self.config.experiments() {
            writeln!(f, "  - {}: {}", exp.name, exp.sequence_names.join(", "))?;
        }
        Ok(())
    }
}

/// Fieldmap linkage results
pub struct LinkReport<'a> {
    links: &'a [FieldmapLink],
    summary: &'a LinkSummary,
}

impl<'a> LinkReport<'a> {
    pub fn new(links: &'a [FieldmapLink], summary: &'a LinkSummary) -> Self {
        Self { links, summary }
    }
}

impl<'a> fmt::Display for LinkReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fieldmap Linkage")?;
        writeln!(f, "================")?;
        writeln!(f)?;
        for link in self.links {
            writeln!(
                f,
                "{:<20} runs {}",
                link.field_identifier(),
                link.runs.join(", ")
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Fieldmap sidecars updated: {}", self.summary.fieldmaps_updated)?;
        writeln!(f, "BOLD sidecars updated:     {}", self.summary.bolds_updated)?;
        write!(f, "Skipped:                   {}", self.summary.skipped)
    }
}

/// Pass/fail counts for a QC run
pub struct QcReport<'a> {
    records: &'a [QcRecord],
}

impl<'a> QcReport<'a> {
    pub fn new(records: &'a [QcRecord]) -> Self {
        Self { records }
    }
}

impl<'a> fmt::Display for QcReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let passed = self.records.iter().filter(|r| r.passed()).count();
        writeln!(f, "Files checked: {}", self.records.len())?;
        writeln!(f, "Passed:        {}", passed)?;
        write!(f, "Failed:        {}", self.records.len() - passed)?;
        for record in self.records.iter().filter(|r| !r.passed()) {
            write!(
                f,
                "\n  FAIL {} ({})",
                record.filename,
                record.series_description.as_deref().unwrap_or("unknown")
            )?;
        }
        Ok(())
    }
}

/// Issues accumulated during a run
pub struct DiagnosticsReport<'a> {
    diagnostics: &'a Diagnostics,
}

impl<'a> DiagnosticsReport<'a> {
    pub fn new(diagnostics: &'a Diagnostics) -> Self {
        Self { diagnostics }
    }
}

impl<'a> fmt::Display for DiagnosticsReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.diagnostics.is_empty() {
            return write!(f, "No issues recorded");
        }
        write!(f, "Issues ({}):", self.diagnostics.len())?;
        for issue in self.diagnostics.issues() {
            write!(f, "\n  {}", issue)?;
        }
        Ok(())
    }
}
