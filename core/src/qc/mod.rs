//! Post-conversion metadata QC
//!
//! Checks every produced NIfTI's sidecar against the expected sequence for
//! its acquisition number and writes one CSV row per file.

mod matcher;
mod record;
mod report;
mod run;

pub use matcher::{collect_produced_files, verify, ProducedFile, SidecarState};
pub use record::{QcFlag, QcRecord, MISSING_JSON, INVALID_JSON};
pub use report::{qc_report_path, write_qc_report, QC_HEADERS};
pub use run::{extract_run, filename_run, format_run};
