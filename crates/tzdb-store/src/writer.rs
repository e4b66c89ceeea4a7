use std::collections::HashMap;
use std::path::Path;

use bytes::BufMut;
use tracing::debug;
use tzdb_codec::{encode_rule_set, write_utf};
use tzdb_types::RuleSet;

use crate::error::{StoreError, StoreResult};
use crate::loader::{FORMAT_VERSION, GROUP_ID};

/// Builds `tzdb.dat` files.
///
/// Zones are added to the current version; [`begin_version`] starts another.
/// Region ids are pooled in first-appearance order and identical rule blobs
/// are stored once.
///
/// [`begin_version`]: TzdbWriter::begin_version
#[derive(Debug)]
pub struct TzdbWriter {
    finished: Vec<VersionLinks>,
    current: VersionLinks,
}

#[derive(Debug)]
struct VersionLinks {
    version_id: String,
    zones: Vec<(String, Vec<u8>)>,
}

impl VersionLinks {
    fn new(version_id: String) -> Self {
        Self {
            version_id,
            zones: Vec::new(),
        }
    }
}

impl TzdbWriter {
    pub fn new(version_id: impl Into<String>) -> Self {
        Self {
            finished: Vec::new(),
            current: VersionLinks::new(version_id.into()),
        }
    }

    /// Close the current version and start a new one.
    pub fn begin_version(&mut self, version_id: impl Into<String>) {
        let done = std::mem::replace(&mut self.current, VersionLinks::new(version_id.into()));
        self.finished.push(done);
    }

    /// Link a zone to its encoded rules in the current version.
    pub fn add_zone(&mut self, zone_id: impl Into<String>, rules: &RuleSet) {
        self.add_raw_zone(zone_id, encode_rule_set(rules));
    }

    /// Link a zone to an arbitrary blob in the current version.
    ///
    /// Adding the same zone twice replaces its blob.
    pub fn add_raw_zone(&mut self, zone_id: impl Into<String>, blob: Vec<u8>) {
        let zone_id = zone_id.into();
        match self.current.zones.iter_mut().find(|(id, _)| *id == zone_id) {
            Some(entry) => entry.1 = blob,
            None => self.current.zones.push((zone_id, blob)),
        }
    }

    /// Number of zones linked in the current version.
    pub fn zone_count(&self) -> usize {
        self.current.zones.len()
    }

    /// Serialize every version into a container.
    pub fn finish_to_bytes(&self) -> StoreResult<Vec<u8>> {
        let versions: Vec<&VersionLinks> =
            self.finished.iter().chain(std::iter::once(&self.current)).collect();

        let mut regions: Vec<&str> = Vec::new();
        let mut region_index: HashMap<&str, usize> = HashMap::new();
        let mut blobs: Vec<&[u8]> = Vec::new();
        let mut blob_index: HashMap<&[u8], usize> = HashMap::new();
        let mut links: Vec<Vec<(usize, usize)>> = Vec::with_capacity(versions.len());

        for version in &versions {
            let mut version_links = Vec::with_capacity(version.zones.len());
            for (zone_id, blob) in &version.zones {
                let region = *region_index.entry(zone_id.as_str()).or_insert_with(|| {
                    regions.push(zone_id.as_str());
                    regions.len() - 1
                });
                let rule = *blob_index.entry(blob.as_slice()).or_insert_with(|| {
                    blobs.push(blob.as_slice());
                    blobs.len() - 1
                });
                version_links.push((region, rule));
            }
            links.push(version_links);
        }

        let mut buf = Vec::new();
        buf.put_u8(FORMAT_VERSION);
        put_str(&mut buf, GROUP_ID)?;

        put_count(&mut buf, "version count", versions.len())?;
        for version in &versions {
            put_str(&mut buf, &version.version_id)?;
        }

        put_count(&mut buf, "region count", regions.len())?;
        for region in &regions {
            put_str(&mut buf, region)?;
        }

        put_count(&mut buf, "rule count", blobs.len())?;
        for blob in &blobs {
            put_count(&mut buf, "rule blob length", blob.len())?;
            buf.put_slice(blob);
        }

        for version_links in &links {
            put_count(&mut buf, "link count", version_links.len())?;
            for &(region, rule) in version_links {
                // Region and rule pools are both bounded by their i16 counts.
                buf.put_i16(region as i16);
                buf.put_u16(rule as u16);
            }
        }

        debug!(
            versions = versions.len(),
            regions = regions.len(),
            blobs = blobs.len(),
            bytes = buf.len(),
            "encoded TZDB database"
        );
        Ok(buf)
    }

    /// Serialize and write the container to `path`.
    pub fn finish(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let bytes = self.finish_to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

fn put_count(buf: &mut Vec<u8>, what: &'static str, value: usize) -> StoreResult<()> {
    let count = i16::try_from(value).map_err(|_| StoreError::TooLarge { what, value })?;
    buf.put_i16(count);
    Ok(())
}

fn put_str(buf: &mut Vec<u8>, value: &str) -> StoreResult<()> {
    write_utf(buf, value).map_err(|_| StoreError::TooLarge {
        what: "string",
        value: value.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::TimeZoneDatabase;
    use crate::traits::ZoneRulesProvider;
    use tzdb_types::{AbsoluteTransition, UtcOffset};

    fn off(hours: i32) -> UtcOffset {
        UtcOffset::from_hours_minutes(hours, 0).unwrap()
    }

    #[test]
    fn empty_writer_layout() {
        let bytes = TzdbWriter::new("2024a").finish_to_bytes().unwrap();
        let mut expected = vec![1, 0, 4];
        expected.extend_from_slice(b"TZDB");
        expected.extend_from_slice(&[0, 1, 0, 5]);
        expected.extend_from_slice(b"2024a");
        // no regions, no blobs, one empty link table
        expected.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn identical_blobs_are_shared() {
        let mut writer = TzdbWriter::new("2024a");
        writer.add_zone("Etc/UTC", &RuleSet::fixed(UtcOffset::UTC));
        writer.add_zone("Etc/Zulu", &RuleSet::fixed(UtcOffset::UTC));
        writer.add_zone("Etc/GMT-1", &RuleSet::fixed(off(1)));
        let db = TimeZoneDatabase::from_bytes(&writer.finish_to_bytes().unwrap()).unwrap();
        assert_eq!(db.blob_count(), 2);
        assert_eq!(db.linked_count(), 3);
        assert_eq!(
            db.rules("Etc/UTC").unwrap().unwrap(),
            db.rules("Etc/Zulu").unwrap().unwrap()
        );
    }

    #[test]
    fn regions_keep_first_appearance_order() {
        let mut writer = TzdbWriter::new("2024a");
        writer.add_zone("Zulu/Last", &RuleSet::fixed(UtcOffset::UTC));
        writer.add_zone("Alpha/First", &RuleSet::fixed(UtcOffset::UTC));
        let db = TimeZoneDatabase::from_bytes(&writer.finish_to_bytes().unwrap()).unwrap();
        assert_eq!(db.region_ids(), ["Zulu/Last", "Alpha/First"]);
    }

    #[test]
    fn adding_zone_twice_replaces() {
        let mut writer = TzdbWriter::new("2024a");
        writer.add_zone("Etc/UTC", &RuleSet::fixed(off(1)));
        writer.add_zone("Etc/UTC", &RuleSet::fixed(UtcOffset::UTC));
        assert_eq!(writer.zone_count(), 1);
        let db = TimeZoneDatabase::from_bytes(&writer.finish_to_bytes().unwrap()).unwrap();
        assert_eq!(*db.rules("Etc/UTC").unwrap().unwrap(), RuleSet::fixed(UtcOffset::UTC));
    }

    #[test]
    fn multiple_versions_keep_last() {
        let mut writer = TzdbWriter::new("2023c");
        writer.add_zone("Europe/Old", &RuleSet::fixed(off(1)));
        writer.begin_version("2024a");
        writer.add_zone("Europe/New", &RuleSet::fixed(off(2)));
        let db = TimeZoneDatabase::from_bytes(&writer.finish_to_bytes().unwrap()).unwrap();
        assert_eq!(db.version_id(), "2024a");
        assert_eq!(db.region_ids(), ["Europe/Old", "Europe/New"]);
        assert!(db.rules("Europe/Old").unwrap().is_none());
        assert_eq!(*db.rules("Europe/New").unwrap().unwrap(), RuleSet::fixed(off(2)));
    }

    #[test]
    fn rules_roundtrip_through_file() {
        let rules = RuleSet::from_transitions(
            off(1),
            off(1),
            &[],
            &[AbsoluteTransition::new(-1_693_706_400, off(1), off(2))],
            vec![],
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tzdb.dat");
        let mut writer = TzdbWriter::new("2024a");
        writer.add_zone("Europe/Berlin", &rules);
        writer.finish(&path).unwrap();

        let db = TimeZoneDatabase::open(&path).unwrap();
        assert_eq!(*db.require_rules("Europe/Berlin").unwrap(), rules);
    }

    #[test]
    fn oversized_blob_rejected() {
        let mut writer = TzdbWriter::new("2024a");
        writer.add_raw_zone("Huge/Zone", vec![1; 40_000]);
        let err = writer.finish_to_bytes().unwrap_err();
        assert!(matches!(
            err,
            StoreError::TooLarge {
                what: "rule blob length",
                value: 40_000
            }
        ));
    }

    #[test]
    fn oversized_string_rejected() {
        let writer = TzdbWriter::new("v".repeat(70_000));
        assert!(matches!(
            writer.finish_to_bytes(),
            Err(StoreError::TooLarge { what: "string", .. })
        ));
    }
}
