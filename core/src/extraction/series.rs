use super::files::collect_dicom_files;
use super::tags::{
    get_int_value, get_string_value, get_u16_value, ACQUISITION_NUMBER, COLUMNS,
    NUMBER_OF_FRAMES, PROTOCOL_NAME, ROWS, SERIES_DESCRIPTION, SERIES_INSTANCE_UID,
    SERIES_NUMBER, TEMPORAL_POSITION_IDENTIFIER,
};
use crate::error::Result;
use crate::types::{Dims, RawSeriesRecord};
use dicom_object::{open_file, InMemDicomObject};
use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Header fields of one DICOM instance relevant to series grouping
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstanceHeader {
    pub series_instance_uid: Option<String>,
    pub series_number: i32,
    pub series_description: String,
    pub protocol_name: String,
    pub rows: u16,
    pub columns: u16,
    /// Volume index: TemporalPositionIdentifier, else AcquisitionNumber
    pub volume: Option<i32>,
    pub frames: u32,
}

impl InstanceHeader {
    /// Reads the grouping fields from an opened DICOM object
    pub fn from_dicom(dcm: &InMemDicomObject) -> Self {
        Self {
            series_instance_uid: get_string_value(dcm, SERIES_INSTANCE_UID)
                .filter(|uid| !uid.is_empty()),
            series_number: get_int_value(dcm, SERIES_NUMBER).unwrap_or(0),
            series_description: get_string_value(dcm, SERIES_DESCRIPTION).unwrap_or_default(),
            protocol_name: get_string_value(dcm, PROTOCOL_NAME).unwrap_or_default(),
            rows: get_u16_value(dcm, ROWS).unwrap_or(0),
            columns: get_u16_value(dcm, COLUMNS).unwrap_or(0),
            volume: get_int_value(dcm, TEMPORAL_POSITION_IDENTIFIER)
                .or_else(|| get_int_value(dcm, ACQUISITION_NUMBER)),
            frames: get_int_value(dcm, NUMBER_OF_FRAMES)
                .filter(|&n| n > 0)
                .map(|n| n as u32)
                .unwrap_or(1),
        }
    }

    fn group_key(&self) -> String {
        match &self.series_instance_uid {
            Some(uid) => uid.clone(),
            None => format!("series-{}", self.series_number),
        }
    }
}

struct SeriesAccumulator {
    first: InstanceHeader,
    volumes: BTreeSet<i32>,
    frames: u32,
}

/// Builds a series id of the form `{number}-{description}`
///
/// Characters other than ASCII alphanumerics, `-` and `_` become `_`.
pub fn series_id(series_number: i32, description: &str) -> String {
    let cleaned: String = description
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        series_number.to_string()
    } else {
        format!("{}-{}", series_number, cleaned)
    }
}

/// Groups instance headers into series records ordered by series number
///
/// Dimensions are (rows, columns, slices, volumes); volumes is the number
/// of distinct volume indices (at least 1) and slices the total frame count
/// divided by volumes.
pub fn group_series(headers: Vec<InstanceHeader>) -> Vec<RawSeriesRecord> {
    let mut groups: BTreeMap<String, SeriesAccumulator> = BTreeMap::new();

    for header in headers {
        let key = header.group_key();
        let frames = header.frames;
        let volume = header.volume;
        let acc = groups.entry(key).or_insert_with(|| SeriesAccumulator {
            first: header,
            volumes: BTreeSet::new(),
            frames: 0,
        });
        acc.frames += frames;
        if let Some(volume) = volume {
            acc.volumes.insert(volume);
        }
    }

    let mut records: Vec<RawSeriesRecord> = groups
        .into_values()
        .map(|acc| {
            let volumes = (acc.volumes.len() as u32).max(1);
            let first = acc.first;
            RawSeriesRecord {
                series_id: series_id(first.series_number, &first.series_description),
                series_description: first.series_description,
                dims: Dims(
                    first.rows as u32,
                    first.columns as u32,
                    acc.frames / volumes,
                    volumes,
                ),
                series_number: first.series_number,
                protocol_name: first.protocol_name,
            }
        })
        .collect();

    records.sort_by(|a, b| {
        a.series_number
            .cmp(&b.series_number)
            .then_with(|| a.series_id.cmp(&b.series_id))
    });
    records
}

/// Reads every DICOM file under `directory` and summarizes its series
///
/// Files that cannot be parsed are skipped with a warning.
pub fn scan_series(directory: &Path) -> Result<Vec<RawSeriesRecord>> {
    let files = collect_dicom_files(directory)?;
    info!("Found {} DICOM files in {}", files.len(), directory.display());

    let mut headers = Vec::with_capacity(files.len());
    for path in files {
        match open_file(&path) {
            Ok(dcm) => headers.push(InstanceHeader::from_dicom(&dcm)),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    let records = group_series(headers);
    info!("Grouped into {} series", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::{DataElement, PrimitiveValue, VR};

    fn header(uid: &str, number: i32, description: &str, volume: Option<i32>) -> InstanceHeader {
        InstanceHeader {
            series_instance_uid: Some(uid.to_string()),
            series_number: number,
            series_description: description.to_string(),
            protocol_name: description.to_string(),
            rows: 64,
            columns: 64,
            volume,
            frames: 1,
        }
    }

    #[test]
    fn test_from_dicom() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            SERIES_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from("1.2.3"),
        ));
        dcm.put(DataElement::new(SERIES_NUMBER, VR::IS, PrimitiveValue::from("7")));
        dcm.put(DataElement::new(
            SERIES_DESCRIPTION,
            VR::LO,
            PrimitiveValue::from("test_run1"),
        ));
        dcm.put(DataElement::new(
            ACQUISITION_NUMBER,
            VR::IS,
            PrimitiveValue::from("4"),
        ));

        let header = InstanceHeader::from_dicom(&dcm);
        assert_eq!(header.series_instance_uid.as_deref(), Some("1.2.3"));
        assert_eq!(header.series_number, 7);
        assert_eq!(header.series_description, "test_run1");
        assert_eq!(header.volume, Some(4));
        assert_eq!(header.frames, 1);
        assert_eq!(header.protocol_name, "");
    }

    #[test]
    fn test_series_id() {
        assert_eq!(series_id(3, "T1w MPRAGE"), "3-T1w_MPRAGE");
        assert_eq!(series_id(9, "pe1_CAL"), "9-pe1_CAL");
        assert_eq!(series_id(1, ""), "1");
    }

    #[test]
    fn test_group_series_dims_and_order() {
        let mut headers = Vec::new();
        for volume in 1..=3 {
            for _slice in 0..2 {
                headers.push(header("1.2.7", 7, "test_run1", Some(volume)));
            }
        }
        for _slice in 0..4 {
            headers.push(header("1.2.3", 3, "T1w MPRAGE", None));
        }

        let records = group_series(headers);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].series_number, 3);
        assert_eq!(records[0].dims, Dims(64, 64, 4, 1));
        assert_eq!(records[1].series_id, "7-test_run1");
        assert_eq!(records[1].dims, Dims(64, 64, 2, 3));
    }

    #[test]
    fn test_group_without_uid_uses_series_number() {
        let mut a = header("", 5, "rest", None);
        a.series_instance_uid = None;
        let b = a.clone();

        let records = group_series(vec![a, b]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].dims.2, 2);
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(scan_series(dir.path()).unwrap().is_empty());
    }
}
