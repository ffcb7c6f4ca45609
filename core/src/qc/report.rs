use super::record::QcRecord;
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Column names of the QC report
pub const QC_HEADERS: [&str; 8] = [
    "Filename",
    "AcquisitionNumber",
    "SeriesDescription",
    "MatchedSequence",
    "SequenceType",
    "Match",
    "RunFromDescription",
    "RunMatchToFilename",
];

/// `{log_dir}/qc-verify_nii_metadata/sub-{subject}_qc_summary.csv`
pub fn qc_report_path(log_dir: &Path, subject: &str) -> PathBuf {
    log_dir
        .join("qc-verify_nii_metadata")
        .join(format!("sub-{}_qc_summary.csv", subject))
}

/// Writes the QC report, creating parent directories
///
/// The header row is always written, so an empty record list still yields
/// a valid report.
pub fn write_qc_report(path: &Path, records: &[QcRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(QC_HEADERS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
