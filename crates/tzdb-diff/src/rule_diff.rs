//! Rule diff: compare the decoded rules of zones both databases know.
//!
//! A zone whose rules fail to decode on either side is reported as different
//! along with the error; it never stops the remaining zones from being
//! compared.

use std::sync::Arc;

use serde::{Serialize, Serializer};
use tracing::debug;
use tzdb_store::{StoreError, StoreResult, ZoneRulesProvider};
use tzdb_types::RuleSet;

/// Outcome of looking up one zone in one database.
#[derive(Debug)]
pub enum RuleLookup {
    /// The rules decoded successfully.
    Found(Arc<RuleSet>),
    /// The id is listed but not linked to any rules.
    Missing,
    /// The rule blob could not be decoded.
    Failed(StoreError),
}

impl RuleLookup {
    /// Look up `zone_id` in `provider`.
    pub fn resolve(provider: &dyn ZoneRulesProvider, zone_id: &str) -> Self {
        Self::from(provider.rules(zone_id))
    }

    pub fn rules(&self) -> Option<&RuleSet> {
        match self {
            Self::Found(rules) => Some(rules.as_ref()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&StoreError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Two lookups match when both found equal rules or both found nothing.
    /// A failed lookup never matches.
    pub fn matches(&self, other: &RuleLookup) -> bool {
        match (self, other) {
            (Self::Found(a), Self::Found(b)) => a == b,
            (Self::Missing, Self::Missing) => true,
            _ => false,
        }
    }
}

impl From<StoreResult<Option<Arc<RuleSet>>>> for RuleLookup {
    fn from(result: StoreResult<Option<Arc<RuleSet>>>) -> Self {
        match result {
            Ok(Some(rules)) => Self::Found(rules),
            Ok(None) => Self::Missing,
            Err(err) => Self::Failed(err),
        }
    }
}

impl Serialize for RuleLookup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Found(rules) => {
                serializer.serialize_newtype_variant("RuleLookup", 0, "found", rules.as_ref())
            }
            Self::Missing => serializer.serialize_unit_variant("RuleLookup", 1, "missing"),
            Self::Failed(err) => {
                serializer.serialize_newtype_variant("RuleLookup", 2, "failed", &err.to_string())
            }
        }
    }
}

/// A zone whose rules differ between the two databases.
#[derive(Debug, Serialize)]
pub struct RuleDelta {
    pub zone_id: String,
    pub left: RuleLookup,
    pub right: RuleLookup,
}

impl RuleDelta {
    /// Returns `true` if either side failed to decode.
    pub fn has_error(&self) -> bool {
        self.left.error().is_some() || self.right.error().is_some()
    }
}

/// The result of comparing rules over the shared zone ids.
#[derive(Debug, Default, Serialize)]
pub struct RuleDiff {
    /// Zones with matching rules, sorted.
    pub equal: Vec<String>,
    /// Zones with differing rules or a decode failure, sorted by zone id.
    pub different: Vec<RuleDelta>,
}

impl RuleDiff {
    /// Returns `true` if every shared zone has matching rules.
    pub fn is_identical(&self) -> bool {
        self.different.is_empty()
    }

    /// Number of zones compared.
    pub fn len(&self) -> usize {
        self.equal.len() + self.different.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every decode failure, as `(zone id, error)`.
    pub fn errors(&self) -> impl Iterator<Item = (&str, &StoreError)> {
        self.different.iter().flat_map(|delta| {
            [delta.left.error(), delta.right.error()]
                .into_iter()
                .flatten()
                .map(move |err| (delta.zone_id.as_str(), err))
        })
    }
}

/// Compare the rules of every zone id known to both databases.
pub fn diff_rules(left: &dyn ZoneRulesProvider, right: &dyn ZoneRulesProvider) -> RuleDiff {
    let left_ids = left.zone_ids();
    let right_ids = right.zone_ids();

    let mut diff = RuleDiff::default();
    for zone_id in left_ids.intersection(&right_ids) {
        let l = RuleLookup::resolve(left, zone_id);
        let r = RuleLookup::resolve(right, zone_id);
        if l.matches(&r) {
            diff.equal.push(zone_id.clone());
        } else {
            diff.different.push(RuleDelta {
                zone_id: zone_id.clone(),
                left: l,
                right: r,
            });
        }
    }

    debug!(
        left = %left.version_id(),
        right = %right.version_id(),
        equal = diff.equal.len(),
        different = diff.different.len(),
        errors = diff.errors().count(),
        "compared zone rules"
    );
    diff
}
