//! Scan-role classification
//!
//! Assigns raw scanner series to logical sequence roles and plans the BIDS
//! output key for each match.

mod classifier;
mod planner;
mod rules;

pub use classifier::{classify, ClassificationResult};
pub use planner::{plan_outputs, PlannedOutput};
pub use rules::{MatchRule, RoleRule, RoleRules};
