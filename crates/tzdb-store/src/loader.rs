//! Container loader for `tzdb.dat` files.
//!
//! Layout, all integers big-endian:
//!
//! ```text
//! u8      format version (1)
//! utf     group id ("TZDB")
//! i16     version count, then that many utf version ids
//! i16     region count, then that many utf region ids
//! i16     rule count, then that many (i16 length, bytes) blobs
//! per version:
//!   i16   link count, then that many (i16 region index, u16 rule index)
//! ```
//!
//! Only the last version id and the last version's links are kept.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;
use tzdb_codec::ByteReader;

use crate::config::StoreConfig;
use crate::database::TimeZoneDatabase;
use crate::error::{StoreError, StoreResult};

/// The only supported container format version.
pub const FORMAT_VERSION: u8 = 1;

/// Group id written after the format version.
pub const GROUP_ID: &str = "TZDB";

impl TimeZoneDatabase {
    /// Parse a database from the full contents of a `tzdb.dat` file.
    ///
    /// Blobs are stored undecoded; a corrupt blob only surfaces when its
    /// zone is looked up.
    pub fn from_bytes(data: &[u8]) -> StoreResult<Self> {
        let mut r = ByteReader::new(data);

        let format = r.read_u8()?;
        if format != FORMAT_VERSION {
            return Err(StoreError::Format(format!(
                "unsupported format version {format}"
            )));
        }
        let group = r.read_utf()?;
        if group != GROUP_ID {
            return Err(StoreError::Format(format!("unexpected group id {group:?}")));
        }

        let version_count = read_count(&mut r, "version count")?;
        let mut version_id = String::new();
        for _ in 0..version_count {
            version_id = r.read_utf()?.to_string();
        }

        let region_count = read_count(&mut r, "region count")?;
        let mut region_ids = Vec::with_capacity(region_count);
        for _ in 0..region_count {
            region_ids.push(r.read_utf()?.to_string());
        }

        let rule_count = read_count(&mut r, "rule count")?;
        let mut blobs = Vec::with_capacity(rule_count);
        for _ in 0..rule_count {
            let len = read_count(&mut r, "rule blob length")?;
            blobs.push(Bytes::copy_from_slice(r.read_bytes(len)?));
        }

        let mut links = HashMap::new();
        for _ in 0..version_count {
            let link_count = read_count(&mut r, "link count")?;
            links.clear();
            for _ in 0..link_count {
                let region_index = r.read_i16()?;
                let rule_index = r.read_u16()?;
                let region = usize::try_from(region_index)
                    .ok()
                    .and_then(|i| region_ids.get(i))
                    .ok_or(StoreError::IndexOutOfRange {
                        kind: "region",
                        index: i64::from(region_index),
                        len: region_ids.len(),
                    })?;
                let blob = blobs
                    .get(usize::from(rule_index))
                    .ok_or(StoreError::IndexOutOfRange {
                        kind: "rule",
                        index: i64::from(rule_index),
                        len: blobs.len(),
                    })?;
                links.insert(region.clone(), blob.clone());
            }
        }

        debug!(
            version = %version_id,
            regions = region_ids.len(),
            blobs = blobs.len(),
            links = links.len(),
            "loaded TZDB database"
        );

        Ok(Self::from_parts(version_id, region_ids, blobs.len(), links))
    }

    /// Open a database file, or the default data file inside a directory.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with(path, &StoreConfig::default())
    }

    /// Open a database using the given configuration.
    pub fn open_with(path: impl AsRef<Path>, config: &StoreConfig) -> StoreResult<Self> {
        let file = resolve_data_file(path.as_ref(), config);
        let data = std::fs::read(&file)?;
        debug!(path = %file.display(), bytes = data.len(), "read TZDB file");
        Self::from_bytes(&data)
    }
}

/// The file to read for `path`: the path itself, or the configured data
/// file inside it when it names a directory.
pub fn resolve_data_file(path: &Path, config: &StoreConfig) -> PathBuf {
    if path.is_dir() {
        path.join(&config.data_file_name)
    } else {
        path.to_path_buf()
    }
}

fn read_count(r: &mut ByteReader<'_>, what: &str) -> StoreResult<usize> {
    let value = r.read_i16()?;
    usize::try_from(value).map_err(|_| StoreError::Format(format!("negative {what}: {value}")))
}
