use std::fmt;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::offset::UtcOffset;

/// A single historical change of a zone's wall offset.
///
/// The instant is `epoch_second`; local clocks read `offset_before` up to it
/// and `offset_after` from it on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbsoluteTransition {
    /// Instant of the change, seconds since 1970-01-01T00:00Z.
    pub epoch_second: i64,
    /// Wall offset in force before the instant.
    pub offset_before: UtcOffset,
    /// Wall offset in force from the instant on.
    pub offset_after: UtcOffset,
}

impl AbsoluteTransition {
    pub fn new(epoch_second: i64, offset_before: UtcOffset, offset_after: UtcOffset) -> Self {
        Self {
            epoch_second,
            offset_before,
            offset_after,
        }
    }

    /// Clocks jump forward: some local times never happen.
    pub fn is_gap(&self) -> bool {
        self.offset_after > self.offset_before
    }

    /// Clocks fall back: some local times happen twice.
    pub fn is_overlap(&self) -> bool {
        self.offset_after < self.offset_before
    }

    /// Signed change in seconds (`after - before`).
    pub fn duration_seconds(&self) -> i32 {
        self.offset_after.total_seconds() - self.offset_before.total_seconds()
    }
}

/// Formats the transition instant as the local date-time seen just before it,
/// e.g. `1916-05-01T00:00`, adding seconds only when they are non-zero.
fn fmt_local_before(t: &AbsoluteTransition, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let local = t
        .epoch_second
        .checked_add(i64::from(t.offset_before.total_seconds()))
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
    match local {
        Some(dt) if dt.second() != 0 => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
        Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M")),
        None => write!(f, "epoch {}", t.epoch_second),
    }
}

impl fmt::Display for AbsoluteTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_gap() { "Gap" } else { "Overlap" };
        write!(f, "Transition[{kind} at ")?;
        fmt_local_before(self, f)?;
        write!(f, "{} to {}]", self.offset_before, self.offset_after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn off(hours: i32) -> UtcOffset {
        UtcOffset::from_hours_minutes(hours, 0).unwrap()
    }

    #[test]
    fn gap_and_overlap() {
        let spring = AbsoluteTransition::new(0, off(1), off(2));
        assert!(spring.is_gap());
        assert!(!spring.is_overlap());
        assert_eq!(spring.duration_seconds(), 3600);

        let autumn = AbsoluteTransition::new(0, off(2), off(1));
        assert!(autumn.is_overlap());
        assert_eq!(autumn.duration_seconds(), -3600);
    }

    #[test]
    fn display_uses_local_time_before() {
        // 1916-04-30T23:00Z seen at +01:00 is 1916-05-01T00:00.
        let t = AbsoluteTransition::new(-1_693_702_800, off(1), off(2));
        assert_eq!(
            t.to_string(),
            "Transition[Gap at 1916-05-01T00:00+01:00 to +02:00]"
        );
    }

    #[test]
    fn display_includes_nonzero_seconds() {
        let lmt = UtcOffset::from_total_seconds(-968).unwrap();
        let t = AbsoluteTransition::new(-1_830_383_032, lmt, UtcOffset::UTC);
        assert_eq!(
            t.to_string(),
            "Transition[Gap at 1912-01-01T00:00-00:16:08 to Z]"
        );
    }
}
