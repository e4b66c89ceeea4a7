use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tzdb_types::RuleSet;

use crate::error::{StoreError, StoreResult};

/// A source of zone rules keyed by zone id.
///
/// Implementations must satisfy these invariants:
/// - `zone_ids` does not depend on whether any rules have been decoded.
/// - `rules` returns equal values for the same id on every successful call.
/// - A failure for one id never affects lookups of other ids.
pub trait ZoneRulesProvider: Send + Sync {
    /// Identifier of the rules version this provider serves.
    fn version_id(&self) -> &str;

    /// Every zone id the provider knows about.
    fn zone_ids(&self) -> BTreeSet<String>;

    /// Look up the rules for a zone.
    ///
    /// Returns `Ok(None)` if the id is not known.
    /// Returns `Err` if the stored rules cannot be decoded.
    fn rules(&self, zone_id: &str) -> StoreResult<Option<Arc<RuleSet>>>;

    /// Like [`rules`](Self::rules), but an unknown id is an error.
    fn require_rules(&self, zone_id: &str) -> StoreResult<Arc<RuleSet>> {
        self.rules(zone_id)?
            .ok_or_else(|| StoreError::UnknownZone(zone_id.to_string()))
    }

    /// Rules for a zone keyed by version id.
    ///
    /// Default implementation returns the single active version, or an empty
    /// map when the id is not known.
    fn versions(&self, zone_id: &str) -> StoreResult<BTreeMap<String, Arc<RuleSet>>> {
        let mut map = BTreeMap::new();
        if let Some(rules) = self.rules(zone_id)? {
            map.insert(self.version_id().to_string(), rules);
        }
        Ok(map)
    }
}
