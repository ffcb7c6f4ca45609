use std::fmt;

/// Image dimensions of a series: rows, columns, slices, volumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dims(pub u32, pub u32, pub u32, pub u32);

impl Dims {
    /// Number of volumes (time points) in the series
    pub fn volumes(&self) -> u32 {
        self.3
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}x{}", self.0, self.1, self.2, self.3)
    }
}

/// Header summary of one scanner series
///
/// Read-only input to the classifier. Produced by
/// [`scan_series`](crate::extraction::scan_series) or any other header reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSeriesRecord {
    pub series_id: String,
    pub series_description: String,
    pub dims: Dims,
    pub series_number: i32,
    pub protocol_name: String,
}

impl RawSeriesRecord {
    /// Creates a record with empty protocol name and zero dims
    pub fn new(
        series_id: impl Into<String>,
        series_number: i32,
        series_description: impl Into<String>,
    ) -> Self {
        Self {
            series_id: series_id.into(),
            series_description: series_description.into(),
            dims: Dims::default(),
            series_number,
            protocol_name: String::new(),
        }
    }

    pub fn with_dims(mut self, dims: Dims) -> Self {
        self.dims = dims;
        self
    }

    pub fn with_protocol_name(mut self, protocol_name: impl Into<String>) -> Self {
        self.protocol_name = protocol_name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dims_display() {
        let dims = Dims(64, 64, 40, 210);
        assert_eq!(dims.to_string(), "64x64x40x210");
        assert_eq!(dims.volumes(), 210);
    }

    #[test]
    fn test_builder() {
        let record = RawSeriesRecord::new("3-T1w", 3, "T1w MPRAGE")
            .with_protocol_name("T1w_MPR")
            .with_dims(Dims(256, 256, 176, 1));
        assert_eq!(record.series_number, 3);
        assert_eq!(record.protocol_name, "T1w_MPR");
        assert_eq!(record.dims.volumes(), 1);
    }
}
