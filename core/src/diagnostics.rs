//! Data-quality issue accumulation
//!
//! Classification, linking and QC never abort on a single bad series or
//! file. Instead they record an [`Issue`] in a [`Diagnostics`] context that
//! the caller passes in explicitly and inspects (or reports) afterwards.

use log::{debug, warn};
use std::fmt;
use std::path::PathBuf;

/// Kind of data-quality issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// A series matched no role, or a required role matched nothing
    ClassificationMiss,
    /// A series matched more than one role
    MultipleRoles,
    /// A run in the fieldmap map has no functional counterpart
    LinkageInconsistency,
    /// An expected sidecar or image file is absent
    MissingInput,
}

impl IssueKind {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            IssueKind::ClassificationMiss => "classification-miss",
            IssueKind::MultipleRoles => "multiple-roles",
            IssueKind::LinkageInconsistency => "linkage-inconsistency",
            IssueKind::MissingInput => "missing-input",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// A single recorded issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: IssueKind,
    pub message: String,
    pub path: Option<PathBuf>,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(path) = &self.path {
            write!(f, " ({})", path.display())?;
        }
        Ok(())
    }
}

/// Append-only collection of issues for one subject/session run
#[derive(Debug, Default)]
pub struct Diagnostics {
    issues: Vec<Issue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an issue and emits it through the logger
    ///
    /// Multi-role matches are logged at debug level since they are expected
    /// for some heuristics; everything else is a warning.
    pub fn record(&mut self, kind: IssueKind, message: impl Into<String>) {
        self.push(Issue {
            kind,
            message: message.into(),
            path: None,
        });
    }

    /// Records an issue tied to a file path
    pub fn record_path(&mut self, kind: IssueKind, message: impl Into<String>, path: PathBuf) {
        self.push(Issue {
            kind,
            message: message.into(),
            path: Some(path),
        });
    }

    fn push(&mut self, issue: Issue) {
        match issue.kind {
            IssueKind::MultipleRoles => debug!("{}", issue),
            _ => warn!("{}", issue),
        }
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Issues of a given kind, in recording order
    pub fn of_kind<'a>(&'a self, kind: &'a IssueKind) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues.iter().filter(move |issue| &issue.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }
}
