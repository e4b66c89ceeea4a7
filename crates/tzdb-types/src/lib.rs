//! Foundation types for TZDB rule databases.
//!
//! This crate provides the value types that a decoded rule blob turns into.
//! Every other tzdb crate depends on `tzdb-types`.
//!
//! # Key Types
//!
//! - [`UtcOffset`] -- Seconds east of UTC, validated to +/-18 hours
//! - [`AbsoluteTransition`] -- One historical offset change at a fixed instant
//! - [`RecurringTransitionRule`] -- Annually recurring offset change (DST start/end)
//! - [`TimeDefinition`] -- How a recurring rule's local time is interpreted
//! - [`RuleSet`] -- The full offset history of a zone

pub mod error;
pub mod offset;
pub mod rule;
pub mod rules;
pub mod transition;

pub use error::{TypeError, TypeResult};
pub use offset::{UtcOffset, MAX_OFFSET_SECONDS};
pub use rule::{month_from_number, weekday_from_iso, RecurringTransitionRule, TimeDefinition};
pub use rules::{RuleSet, MAX_LAST_RULES};
pub use transition::AbsoluteTransition;

// Calendar types used in the public API.
pub use chrono::{Month, NaiveTime, Weekday};
