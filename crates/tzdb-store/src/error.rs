use tzdb_codec::CodecError;

/// Errors from loading, querying, or writing a TZDB database.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The container is malformed: bad version byte, bad group id,
    /// truncated stream, or an invalid count or length.
    #[error("file format not recognised: {0}")]
    Format(String),

    /// A linkage index points outside the region or rule pool.
    #[error("{kind} index {index} out of range (pool size {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: i64,
        len: usize,
    },

    /// The zone id is not linked in this database.
    #[error("unknown time-zone id: {0}")]
    UnknownZone(String),

    /// A zone's rule blob could not be decoded.
    #[error("invalid binary time-zone data: TZDB:{zone_id}, version: {version_id}: {source}")]
    Decode {
        zone_id: String,
        version_id: String,
        #[source]
        source: CodecError,
    },

    /// A value does not fit the width the file format gives it.
    #[error("{what} too large for the file format: {value}")]
    TooLarge { what: &'static str, value: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` for errors that make a whole file unusable.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Format(_) | Self::IndexOutOfRange { .. })
    }
}

impl From<CodecError> for StoreError {
    fn from(err: CodecError) -> Self {
        Self::Format(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
