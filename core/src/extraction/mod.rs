//! DICOM header reading
//!
//! Turns a directory of DICOM instances into per-series
//! [`RawSeriesRecord`](crate::types::RawSeriesRecord)s for classification.

pub mod files;
pub mod series;
pub mod tags;

pub use files::{collect_dicom_files, is_dicom_file};
pub use series::{group_series, scan_series, series_id, InstanceHeader};
pub use tags::*;
