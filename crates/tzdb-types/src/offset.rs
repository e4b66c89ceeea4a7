use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};

/// The largest magnitude an offset may have: 18 hours.
pub const MAX_OFFSET_SECONDS: i32 = 18 * 3600;

/// A fixed offset from UTC, in whole seconds east of Greenwich.
///
/// Always within `-18:00..=+18:00`. Ordering follows the signed number of
/// seconds, so `-05:00 < Z < +01:00`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct UtcOffset(i32);

impl UtcOffset {
    /// The zero offset (`Z`).
    pub const UTC: UtcOffset = UtcOffset(0);

    /// Create an offset from a total number of seconds.
    pub fn from_total_seconds(seconds: i32) -> TypeResult<Self> {
        if !(-MAX_OFFSET_SECONDS..=MAX_OFFSET_SECONDS).contains(&seconds) {
            return Err(TypeError::OffsetOutOfRange(seconds));
        }
        Ok(Self(seconds))
    }

    /// Create an offset from hours and minutes. Both components carry the sign.
    pub fn from_hours_minutes(hours: i32, minutes: i32) -> TypeResult<Self> {
        Self::from_total_seconds(hours * 3600 + minutes * 60)
    }

    /// Total seconds east of UTC.
    pub const fn total_seconds(&self) -> i32 {
        self.0
    }

    /// Returns `true` for the zero offset.
    pub const fn is_utc(&self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<i32> for UtcOffset {
    type Error = TypeError;

    fn try_from(seconds: i32) -> TypeResult<Self> {
        Self::from_total_seconds(seconds)
    }
}

impl From<UtcOffset> for i32 {
    fn from(offset: UtcOffset) -> i32 {
        offset.0
    }
}

impl fmt::Debug for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UtcOffset({self})")
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("Z");
        }
        let sign = if self.0 < 0 { '-' } else { '+' };
        let abs = self.0.unsigned_abs();
        let (hours, minutes, seconds) = (abs / 3600, abs / 60 % 60, abs % 60);
        write!(f, "{sign}{hours:02}:{minutes:02}")?;
        if seconds != 0 {
            write!(f, ":{seconds:02}")?;
        }
        Ok(())
    }
}
