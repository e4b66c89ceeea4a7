use thiserror::Error;

/// Errors produced when constructing model values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("offset out of range: {0} seconds (limit is +/-18 hours)")]
    OffsetOutOfRange(i32),

    #[error("invalid month: {0}")]
    InvalidMonth(u32),

    #[error("invalid day-of-month indicator: {0}")]
    InvalidDayOfMonth(i32),

    #[error("invalid day of week: {0}")]
    InvalidDayOfWeek(u32),

    #[error("invalid second of day: {0}")]
    InvalidTime(i64),

    #[error("invalid time definition ordinal: {0}")]
    InvalidTimeDefinition(u32),

    #[error("end-of-day flag requires a local time of midnight")]
    EndOfDayNotMidnight,

    #[error("{what}: expected {expected} offsets, got {actual}")]
    OffsetCountMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("too many transition rules: {0} (maximum 127)")]
    TooManyRules(usize),
}

/// Convenience alias for model construction results.
pub type TypeResult<T> = Result<T, TypeError>;
