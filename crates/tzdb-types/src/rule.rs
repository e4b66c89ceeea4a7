use std::fmt;

use chrono::{Month, NaiveTime, Timelike, Weekday};
use serde::Serialize;

use crate::error::{TypeError, TypeResult};
use crate::offset::UtcOffset;

/// How the local time of a recurring rule is to be read.
///
/// The discriminants are the ordinals used on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TimeDefinition {
    /// The time is UTC.
    Utc = 0,
    /// The time is local wall-clock time, using the offset before the change.
    Wall = 1,
    /// The time is local standard time.
    Standard = 2,
}

impl TimeDefinition {
    /// Wire ordinal.
    pub fn ordinal(self) -> u32 {
        self as u32
    }

    /// Parse a wire ordinal.
    pub fn from_ordinal(ordinal: u32) -> TypeResult<Self> {
        match ordinal {
            0 => Ok(Self::Utc),
            1 => Ok(Self::Wall),
            2 => Ok(Self::Standard),
            other => Err(TypeError::InvalidTimeDefinition(other)),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Utc => "UTC",
            Self::Wall => "WALL",
            Self::Standard => "STANDARD",
        }
    }
}

/// Convert a month number (1 = January) into a [`Month`].
pub fn month_from_number(number: u32) -> TypeResult<Month> {
    u8::try_from(number)
        .ok()
        .and_then(|n| Month::try_from(n).ok())
        .ok_or(TypeError::InvalidMonth(number))
}

/// Convert an ISO weekday number (1 = Monday, 7 = Sunday) into a [`Weekday`].
pub fn weekday_from_iso(number: u32) -> TypeResult<Weekday> {
    match number {
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        7 => Ok(Weekday::Sun),
        other => Err(TypeError::InvalidDayOfWeek(other)),
    }
}

/// An annually recurring offset change, such as the start of summer time.
///
/// The day is selected by `day_of_month_indicator` and the optional
/// `day_of_week`:
///
/// - no weekday: exactly that day of the month;
/// - weekday and positive indicator: the first such weekday on or after it;
/// - weekday and negative indicator: the last such weekday on or before the
///   day counted back from month end (`-1` is the last day of the month).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RecurringTransitionRule {
    month: Month,
    day_of_month_indicator: i8,
    day_of_week: Option<Weekday>,
    local_time: NaiveTime,
    midnight_end_of_day: bool,
    time_definition: TimeDefinition,
    standard_offset: UtcOffset,
    offset_before: UtcOffset,
    offset_after: UtcOffset,
}

impl RecurringTransitionRule {
    /// Create a validated rule.
    ///
    /// `day_of_month_indicator` must be in `-28..=31` and non-zero,
    /// `local_time` must be a whole second, and `midnight_end_of_day`
    /// (a transition at 24:00) requires `local_time` to be midnight.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        month: Month,
        day_of_month_indicator: i8,
        day_of_week: Option<Weekday>,
        local_time: NaiveTime,
        midnight_end_of_day: bool,
        time_definition: TimeDefinition,
        standard_offset: UtcOffset,
        offset_before: UtcOffset,
        offset_after: UtcOffset,
    ) -> TypeResult<Self> {
        if !(-28..=31).contains(&day_of_month_indicator) || day_of_month_indicator == 0 {
            return Err(TypeError::InvalidDayOfMonth(i32::from(day_of_month_indicator)));
        }
        if local_time.nanosecond() != 0 {
            return Err(TypeError::InvalidTime(i64::from(
                local_time.num_seconds_from_midnight(),
            )));
        }
        if midnight_end_of_day && local_time != NaiveTime::MIN {
            return Err(TypeError::EndOfDayNotMidnight);
        }
        Ok(Self {
            month,
            day_of_month_indicator,
            day_of_week,
            local_time,
            midnight_end_of_day,
            time_definition,
            standard_offset,
            offset_before,
            offset_after,
        })
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn day_of_month_indicator(&self) -> i8 {
        self.day_of_month_indicator
    }

    pub fn day_of_week(&self) -> Option<Weekday> {
        self.day_of_week
    }

    pub fn local_time(&self) -> NaiveTime {
        self.local_time
    }

    pub fn is_midnight_end_of_day(&self) -> bool {
        self.midnight_end_of_day
    }

    /// Second of day of the transition, `86_400` for end of day.
    pub fn second_of_day(&self) -> u32 {
        if self.midnight_end_of_day {
            86_400
        } else {
            self.local_time.num_seconds_from_midnight()
        }
    }

    pub fn time_definition(&self) -> TimeDefinition {
        self.time_definition
    }

    pub fn standard_offset(&self) -> UtcOffset {
        self.standard_offset
    }

    pub fn offset_before(&self) -> UtcOffset {
        self.offset_before
    }

    pub fn offset_after(&self) -> UtcOffset {
        self.offset_after
    }
}

fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MONDAY",
        Weekday::Tue => "TUESDAY",
        Weekday::Wed => "WEDNESDAY",
        Weekday::Thu => "THURSDAY",
        Weekday::Fri => "FRIDAY",
        Weekday::Sat => "SATURDAY",
        Weekday::Sun => "SUNDAY",
    }
}

impl fmt::Display for RecurringTransitionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.offset_after > self.offset_before {
            "Gap"
        } else {
            "Overlap"
        };
        write!(
            f,
            "TransitionRule[{kind} {} to {}, ",
            self.offset_before, self.offset_after
        )?;
        let month = self.month.name().to_uppercase();
        let dom = self.day_of_month_indicator;
        match self.day_of_week {
            Some(day) if dom == -1 => {
                write!(f, "{} on or before last day of {month}", weekday_label(day))?
            }
            Some(day) if dom < 0 => write!(
                f,
                "{} on or before last day minus {} of {month}",
                weekday_label(day),
                -dom - 1
            )?,
            Some(day) => write!(f, "{} on or after {month} {dom}", weekday_label(day))?,
            None => write!(f, "{month} {dom}")?,
        }
        if self.midnight_end_of_day {
            f.write_str(" at 24:00")?;
        } else if self.local_time.second() != 0 {
            write!(f, " at {}", self.local_time.format("%H:%M:%S"))?;
        } else {
            write!(f, " at {}", self.local_time.format("%H:%M"))?;
        }
        write!(
            f,
            " {}, standard offset {}]",
            self.time_definition.label(),
            self.standard_offset
        )
    }
}
