use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use tracing::warn;
use tzdb_codec::decode_rule_set;
use tzdb_types::RuleSet;

use crate::error::{StoreError, StoreResult};
use crate::traits::ZoneRulesProvider;

/// The rules stored for one zone: raw blob bytes until first use, the
/// decoded rule set afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleSlot {
    Raw(Bytes),
    Decoded(Arc<RuleSet>),
}

impl RuleSlot {
    pub fn is_decoded(&self) -> bool {
        matches!(self, Self::Decoded(_))
    }
}

/// A loaded TZDB database with lazily decoded rules.
///
/// The zone id list and version are fixed at load time. Each rule slot
/// starts as raw bytes and is replaced by its decoded [`RuleSet`] on the
/// first successful lookup; a decoded slot never changes again.
///
/// Decoding runs without holding the lock. When two callers race on the same
/// slot both decode (decoding is pure), the first to install its result wins
/// and every caller gets that same `Arc`.
pub struct TimeZoneDatabase {
    version_id: String,
    region_ids: Vec<String>,
    blob_count: usize,
    slots: RwLock<HashMap<String, RuleSlot>>,
}

impl TimeZoneDatabase {
    pub(crate) fn from_parts(
        version_id: String,
        region_ids: Vec<String>,
        blob_count: usize,
        links: HashMap<String, Bytes>,
    ) -> Self {
        let slots = links
            .into_iter()
            .map(|(zone, blob)| (zone, RuleSlot::Raw(blob)))
            .collect();
        Self {
            version_id,
            region_ids,
            blob_count,
            slots: RwLock::new(slots),
        }
    }

    /// Region ids in file order.
    pub fn region_ids(&self) -> &[String] {
        &self.region_ids
    }

    /// Number of rule blobs in the file's pool (shared blobs count once).
    pub fn blob_count(&self) -> usize {
        self.blob_count
    }

    /// Number of zones linked to a rule blob in the active version.
    pub fn linked_count(&self) -> usize {
        self.slots.read().expect("lock poisoned").len()
    }

    /// Number of zones whose rules have been decoded so far.
    pub fn decoded_count(&self) -> usize {
        self.slots
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|slot| slot.is_decoded())
            .count()
    }

    /// Returns `true` if the zone's rules have already been decoded.
    pub fn is_decoded(&self, zone_id: &str) -> bool {
        self.slot(zone_id).is_some_and(|slot| slot.is_decoded())
    }

    /// A snapshot of a zone's slot.
    pub fn slot(&self, zone_id: &str) -> Option<RuleSlot> {
        self.slots.read().expect("lock poisoned").get(zone_id).cloned()
    }
}

impl ZoneRulesProvider for TimeZoneDatabase {
    fn version_id(&self) -> &str {
        &self.version_id
    }

    fn zone_ids(&self) -> BTreeSet<String> {
        self.region_ids.iter().cloned().collect()
    }

    fn rules(&self, zone_id: &str) -> StoreResult<Option<Arc<RuleSet>>> {
        let raw = {
            let slots = self.slots.read().expect("lock poisoned");
            match slots.get(zone_id) {
                Some(RuleSlot::Decoded(rules)) => return Ok(Some(Arc::clone(rules))),
                Some(RuleSlot::Raw(bytes)) => bytes.clone(),
                None => {
                    warn!(zone_id, version = %self.version_id, "unknown time-zone id");
                    return Ok(None);
                }
            }
        };

        let decoded = match decode_rule_set(&raw) {
            Ok(rules) => Arc::new(rules),
            Err(source) => {
                warn!(
                    zone_id,
                    version = %self.version_id,
                    error = %source,
                    "invalid binary time-zone data"
                );
                return Err(StoreError::Decode {
                    zone_id: zone_id.to_string(),
                    version_id: self.version_id.clone(),
                    source,
                });
            }
        };

        let mut slots = self.slots.write().expect("lock poisoned");
        match slots.get_mut(zone_id) {
            // Another caller finished first; keep its value.
            Some(RuleSlot::Decoded(existing)) => Ok(Some(Arc::clone(existing))),
            Some(slot) => {
                *slot = RuleSlot::Decoded(Arc::clone(&decoded));
                Ok(Some(decoded))
            }
            None => Ok(Some(decoded)),
        }
    }
}

impl fmt::Display for TimeZoneDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TZDB[{}]", self.version_id)
    }
}

impl fmt::Debug for TimeZoneDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeZoneDatabase")
            .field("version_id", &self.version_id)
            .field("region_count", &self.region_ids.len())
            .field("blob_count", &self.blob_count)
            .field("decoded_count", &self.decoded_count())
            .finish()
    }
}
