pub mod checksum;
pub mod classification;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extraction;
pub mod fieldmap;
pub mod qc;
pub mod sidecar;
pub mod summary;
pub mod template;
pub mod types;

pub use checksum::{compare_directories, ChecksumComparison, HashAlgorithm};
pub use classification::{
    classify, plan_outputs, ClassificationResult, MatchRule, PlannedOutput, RoleRule, RoleRules,
};
pub use cli::report::{
    ClassificationReport, ConfigReport, DiagnosticsReport, LinkReport, PlanReport, QcReport,
};
pub use config::{ExpectedSeriesMap, SequenceConfig, SeriesOverrides, BASIC_EXPERIMENT};
pub use diagnostics::{Diagnostics, Issue, IssueKind};
pub use error::{BidsError, Result};
pub use extraction::scan_series;
pub use fieldmap::{
    apply_to_dataset, discover_functional_runs, link, parse_run_map, BidsLayout, FieldmapLink,
    FieldmapRunMap, LinkSummary,
};
pub use qc::{
    collect_produced_files, qc_report_path, verify, write_qc_report, ProducedFile, QcFlag,
    QcRecord, SidecarState,
};
pub use summary::{load_diagnostics, summarize, write_summary, DiagnosticSummary};
pub use types::*;
