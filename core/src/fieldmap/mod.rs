//! Fieldmap to functional-run linkage
//!
//! Computes which BOLD runs each fieldmap corrects and writes the
//! `B0FieldIdentifier` / `B0FieldSource` / `IntendedFor` metadata that
//! distortion correction relies on.

mod apply;
mod layout;
mod linker;

pub use apply::{apply_to_dataset, discover_functional_runs, LinkSummary};
pub use layout::BidsLayout;
pub use linker::{
    bold_fields, compare_run_labels, fieldmap_records, link, parse_run_map, FieldmapLink,
    FieldmapRecord, FieldmapRunMap,
};
