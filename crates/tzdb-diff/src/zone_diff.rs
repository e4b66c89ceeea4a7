//! Zone id diff: which zones exist on only one side.

use std::collections::BTreeSet;

use serde::Serialize;
use tzdb_store::ZoneRulesProvider;

/// Zone ids present in only one of two databases.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ZoneIdDiff {
    /// Ids known to the left database but not the right, sorted.
    pub extra_in_left: Vec<String>,
    /// Ids known to the right database but not the left, sorted.
    pub extra_in_right: Vec<String>,
}

impl ZoneIdDiff {
    /// Returns `true` if both databases know exactly the same ids.
    pub fn is_identical(&self) -> bool {
        self.extra_in_left.is_empty() && self.extra_in_right.is_empty()
    }

    /// Total number of one-sided ids.
    pub fn len(&self) -> usize {
        self.extra_in_left.len() + self.extra_in_right.len()
    }

    /// Swap sides.
    pub fn reversed(self) -> Self {
        Self {
            extra_in_left: self.extra_in_right,
            extra_in_right: self.extra_in_left,
        }
    }
}

/// Compare the zone id sets of two databases.
pub fn diff_zone_ids(left: &dyn ZoneRulesProvider, right: &dyn ZoneRulesProvider) -> ZoneIdDiff {
    diff_id_sets(&left.zone_ids(), &right.zone_ids())
}

/// Compare two id sets directly.
pub fn diff_id_sets(left: &BTreeSet<String>, right: &BTreeSet<String>) -> ZoneIdDiff {
    ZoneIdDiff {
        extra_in_left: left.difference(right).cloned().collect(),
        extra_in_right: right.difference(left).cloned().collect(),
    }
}
