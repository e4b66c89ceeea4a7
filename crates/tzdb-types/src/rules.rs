use std::fmt;

use serde::Serialize;

use crate::error::{TypeError, TypeResult};
use crate::offset::UtcOffset;
use crate::rule::RecurringTransitionRule;
use crate::transition::AbsoluteTransition;

/// Most recurring rules a rule set can carry (the count is a signed byte).
pub const MAX_LAST_RULES: usize = 127;

/// The complete offset history of one zone.
///
/// Layout mirrors the binary record so that decoding and re-encoding are
/// exact inverses:
///
/// - `standard_transitions[i]` is the instant at which the standard offset
///   changes from `standard_offsets[i]` to `standard_offsets[i + 1]`;
/// - `savings_instant_transitions[i]` is the instant at which the wall
///   offset changes from `wall_offsets[i]` to `wall_offsets[i + 1]`;
/// - `last_rules` describe changes recurring every year after the final
///   savings transition.
///
/// Equality is structural: every array is compared element for element.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RuleSet {
    standard_transitions: Vec<i64>,
    standard_offsets: Vec<UtcOffset>,
    savings_instant_transitions: Vec<i64>,
    wall_offsets: Vec<UtcOffset>,
    last_rules: Vec<RecurringTransitionRule>,
}

impl RuleSet {
    /// Assemble a rule set from its raw arrays.
    ///
    /// Each offset array must be exactly one longer than its transition
    /// array, and there may be at most [`MAX_LAST_RULES`] recurring rules.
    pub fn new(
        standard_transitions: Vec<i64>,
        standard_offsets: Vec<UtcOffset>,
        savings_instant_transitions: Vec<i64>,
        wall_offsets: Vec<UtcOffset>,
        last_rules: Vec<RecurringTransitionRule>,
    ) -> TypeResult<Self> {
        check_offset_count("standard offsets", &standard_transitions, &standard_offsets)?;
        check_offset_count("wall offsets", &savings_instant_transitions, &wall_offsets)?;
        if last_rules.len() > MAX_LAST_RULES {
            return Err(TypeError::TooManyRules(last_rules.len()));
        }
        Ok(Self {
            standard_transitions,
            standard_offsets,
            savings_instant_transitions,
            wall_offsets,
            last_rules,
        })
    }

    /// A zone that has always used the same offset.
    pub fn fixed(offset: UtcOffset) -> Self {
        Self {
            standard_transitions: Vec::new(),
            standard_offsets: vec![offset],
            savings_instant_transitions: Vec::new(),
            wall_offsets: vec![offset],
            last_rules: Vec::new(),
        }
    }

    /// Build a rule set from transition lists.
    ///
    /// `base_standard` and `base_wall` are the offsets in force before the
    /// first transition of each list; every transition contributes its
    /// `offset_after` to the corresponding offset array.
    pub fn from_transitions(
        base_standard: UtcOffset,
        base_wall: UtcOffset,
        standard_transitions: &[AbsoluteTransition],
        transitions: &[AbsoluteTransition],
        last_rules: Vec<RecurringTransitionRule>,
    ) -> TypeResult<Self> {
        let mut standard_offsets = Vec::with_capacity(standard_transitions.len() + 1);
        standard_offsets.push(base_standard);
        standard_offsets.extend(standard_transitions.iter().map(|t| t.offset_after));

        let mut wall_offsets = Vec::with_capacity(transitions.len() + 1);
        wall_offsets.push(base_wall);
        wall_offsets.extend(transitions.iter().map(|t| t.offset_after));

        Self::new(
            standard_transitions.iter().map(|t| t.epoch_second).collect(),
            standard_offsets,
            transitions.iter().map(|t| t.epoch_second).collect(),
            wall_offsets,
            last_rules,
        )
    }

    pub fn standard_transitions(&self) -> &[i64] {
        &self.standard_transitions
    }

    pub fn standard_offsets(&self) -> &[UtcOffset] {
        &self.standard_offsets
    }

    pub fn savings_instant_transitions(&self) -> &[i64] {
        &self.savings_instant_transitions
    }

    pub fn wall_offsets(&self) -> &[UtcOffset] {
        &self.wall_offsets
    }

    /// The recurring rules applied after the last explicit transition.
    pub fn transition_rules(&self) -> &[RecurringTransitionRule] {
        &self.last_rules
    }

    /// The explicit wall-offset transitions, in instant order.
    pub fn transitions(&self) -> Vec<AbsoluteTransition> {
        self.savings_instant_transitions
            .iter()
            .zip(self.wall_offsets.windows(2))
            .map(|(&epoch, pair)| AbsoluteTransition::new(epoch, pair[0], pair[1]))
            .collect()
    }

    /// Returns `true` if the zone never changes offset: no transitions of
    /// either kind, no recurring rules, and a wall offset equal to the
    /// standard offset.
    pub fn is_fixed_offset(&self) -> bool {
        self.standard_offsets[0] == self.wall_offsets[0]
            && self.standard_transitions.is_empty()
            && self.savings_instant_transitions.is_empty()
            && self.last_rules.is_empty()
    }
}

fn check_offset_count(
    what: &'static str,
    transitions: &[i64],
    offsets: &[UtcOffset],
) -> TypeResult<()> {
    let expected = transitions.len() + 1;
    if offsets.len() != expected {
        return Err(TypeError::OffsetCountMismatch {
            what,
            expected,
            actual: offsets.len(),
        });
    }
    Ok(())
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The constructors guarantee at least one standard offset.
        let current = self.standard_offsets[self.standard_offsets.len() - 1];
        write!(f, "ZoneRules[currentStandardOffset={current}]")
    }
}
