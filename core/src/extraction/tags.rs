use dicom_core::Tag;
use dicom_object::InMemDicomObject;

// Image Geometry Tags
pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);

// Series Identification Tags
pub const SERIES_INSTANCE_UID: Tag = Tag(0x0020, 0x000E);
pub const SERIES_NUMBER: Tag = Tag(0x0020, 0x0011);
pub const ACQUISITION_NUMBER: Tag = Tag(0x0020, 0x0012);
pub const TEMPORAL_POSITION_IDENTIFIER: Tag = Tag(0x0020, 0x0100);

// Description Tags
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);
pub const PROTOCOL_NAME: Tag = Tag(0x0018, 0x1030);

/// Helper to get string value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to string
pub fn get_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim().to_string())
}

/// Helper to get integer value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to i32
pub fn get_int_value(dcm: &InMemDicomObject, tag: Tag) -> Option<i32> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<i32>().ok())
}

/// Helper to get u16 value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to u16
pub fn get_u16_value(dcm: &InMemDicomObject, tag: Tag) -> Option<u16> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<u16>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::{DataElement, PrimitiveValue, VR};

    #[test]
    fn test_tag_values() {
        assert_eq!(SERIES_NUMBER, Tag(0x0020, 0x0011));
        assert_eq!(SERIES_DESCRIPTION, Tag(0x0008, 0x103E));
        assert_eq!(PROTOCOL_NAME, Tag(0x0018, 0x1030));
    }

    #[test]
    fn test_value_helpers() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            SERIES_DESCRIPTION,
            VR::LO,
            PrimitiveValue::from("T1w MPRAGE "),
        ));
        dcm.put(DataElement::new(SERIES_NUMBER, VR::IS, PrimitiveValue::from("3")));
        dcm.put(DataElement::new(ROWS, VR::US, PrimitiveValue::from(256_u16)));

        assert_eq!(
            get_string_value(&dcm, SERIES_DESCRIPTION).as_deref(),
            Some("T1w MPRAGE")
        );
        assert_eq!(get_int_value(&dcm, SERIES_NUMBER), Some(3));
        assert_eq!(get_u16_value(&dcm, ROWS), Some(256));
        assert_eq!(get_int_value(&dcm, ACQUISITION_NUMBER), None);
    }
}
