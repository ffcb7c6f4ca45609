//! Core type definitions for scan classification and BIDS linkage
//!
//! - [`SequenceDefinition`]: One configured logical sequence and its matching rules
//! - [`ExperimentType`]: Ordered preset of sequence names
//! - [`RawSeriesRecord`]: Header summary of one scanner series
//! - [`Dims`]: Rows, columns, slices, volumes of a series
//! - [`PhaseDirection`]: Fieldmap phase-encoding direction lookup table

mod phase;
mod sequence;
mod series;

pub use phase::{PhaseDirection, BOLD_DIRECTION, FIELDMAP_DIRECTIONS};
pub use sequence::{ExperimentType, SequenceDefinition, UNKNOWN_SEQUENCE_DESCRIPTION};
pub use series::{Dims, RawSeriesRecord};
