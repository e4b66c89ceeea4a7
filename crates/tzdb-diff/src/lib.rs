//! Diff engine for TZDB databases.
//!
//! Compares two [`ZoneRulesProvider`]s: which zone ids exist on one side
//! only, and which shared zones decode to different rules. Decode failures
//! are reported per zone and never abort a comparison.
//!
//! # Key Types
//!
//! - [`ZoneIdDiff`] -- zone ids present on only one side
//! - [`RuleDiff`] / [`RuleDelta`] / [`RuleLookup`] -- per-zone rule comparison
//! - [`DatabaseDiff`] -- both of the above
//! - [`TransitionDiff`] / [`DiffHunk`] / [`DiffLine`] -- line diff of rendered transitions
//!
//! [`ZoneRulesProvider`]: tzdb_store::ZoneRulesProvider

pub mod database_diff;
pub mod rule_diff;
pub mod transition_diff;
pub mod zone_diff;

pub use database_diff::{diff_databases, DatabaseDiff};
pub use rule_diff::{diff_rules, RuleDelta, RuleDiff, RuleLookup};
pub use transition_diff::{
    diff_lines, diff_transitions, render_rules, DiffHunk, DiffLine, TransitionDiff,
};
pub use zone_diff::{diff_id_sets, diff_zone_ids, ZoneIdDiff};
