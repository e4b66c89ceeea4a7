use serde::Serialize;
use tzdb_store::ZoneRulesProvider;

use crate::rule_diff::{diff_rules, RuleDiff};
use crate::zone_diff::{diff_zone_ids, ZoneIdDiff};

/// The full comparison of two databases.
#[derive(Debug, Default, Serialize)]
pub struct DatabaseDiff {
    pub zone_ids: ZoneIdDiff,
    pub rules: RuleDiff,
}

impl DatabaseDiff {
    /// Returns `true` if the zone id sets and every shared zone's rules match.
    pub fn is_identical(&self) -> bool {
        self.zone_ids.is_identical() && self.rules.is_identical()
    }
}

/// Compare two databases: zone id sets first, then the rules of shared zones.
pub fn diff_databases(
    left: &dyn ZoneRulesProvider,
    right: &dyn ZoneRulesProvider,
) -> DatabaseDiff {
    DatabaseDiff {
        zone_ids: diff_zone_ids(left, right),
        rules: diff_rules(left, right),
    }
}
