use serde::{Deserialize, Serialize};

/// File name looked up when a database path names a directory.
pub const DEFAULT_DATA_FILE: &str = "tzdb.dat";

/// Configuration for locating and opening database files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Name of the data file inside a database directory.
    pub data_file_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file_name: DEFAULT_DATA_FILE.into(),
        }
    }
}
