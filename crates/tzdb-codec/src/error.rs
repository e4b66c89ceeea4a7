use thiserror::Error;
use tzdb_types::TypeError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("truncated input: needed {needed} more bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("unknown serialized type: {0}")]
    UnknownRecordType(u8),

    #[error("unexpected record: expected {expected}, got {actual}")]
    UnexpectedRecord {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("invalid {what} length: {length}")]
    InvalidLength { what: &'static str, length: i64 },

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid field value: {0}")]
    Invalid(#[from] TypeError),
}

pub type CodecResult<T> = Result<T, CodecError>;
