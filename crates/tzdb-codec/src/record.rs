//! Tagged rule records.
//!
//! A rule blob starts with a one-byte type tag followed by the record body.
//! Offsets and instants inside a body use the compact encodings from
//! [`crate::numeric`].

use bytes::BufMut;
use tzdb_types::{
    month_from_number, weekday_from_iso, AbsoluteTransition, NaiveTime, RecurringTransitionRule,
    RuleSet, TimeDefinition, TypeError, UtcOffset,
};

use crate::error::{CodecError, CodecResult};
use crate::numeric::{read_epoch_second, read_offset, write_epoch_second, write_offset};
use crate::reader::ByteReader;

/// Type tag of a serialized record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    RuleSet,
    Transition,
    TransitionRule,
}

impl RecordKind {
    /// The tag byte written before the record body.
    pub fn type_byte(&self) -> u8 {
        match self {
            Self::RuleSet => 1,
            Self::Transition => 2,
            Self::TransitionRule => 3,
        }
    }

    /// Parse a tag byte.
    pub fn from_type_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::RuleSet),
            2 => Some(Self::Transition),
            3 => Some(Self::TransitionRule),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::RuleSet => "rule set",
            Self::Transition => "transition",
            Self::TransitionRule => "transition rule",
        }
    }
}

/// A decoded record of any kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    RuleSet(RuleSet),
    Transition(AbsoluteTransition),
    TransitionRule(RecurringTransitionRule),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::RuleSet(_) => RecordKind::RuleSet,
            Self::Transition(_) => RecordKind::Transition,
            Self::TransitionRule(_) => RecordKind::TransitionRule,
        }
    }
}

/// Serialize a record, tag byte first.
pub fn encode_record(record: &Record) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.put_u8(record.kind().type_byte());
    match record {
        Record::RuleSet(rules) => write_rule_set(&mut buf, rules),
        Record::Transition(t) => write_transition(&mut buf, t),
        Record::TransitionRule(rule) => write_transition_rule(&mut buf, rule),
    }
    buf
}

/// Serialize a rule set as a complete blob (tag 1 + body).
pub fn encode_rule_set(rules: &RuleSet) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.put_u8(RecordKind::RuleSet.type_byte());
    write_rule_set(&mut buf, rules);
    buf
}

/// Decode a blob into whatever record its tag announces.
///
/// Bytes following a complete record are ignored.
pub fn decode_record(blob: &[u8]) -> CodecResult<Record> {
    let mut r = ByteReader::new(blob);
    let tag = r.read_u8()?;
    let kind = RecordKind::from_type_byte(tag).ok_or(CodecError::UnknownRecordType(tag))?;
    let record = match kind {
        RecordKind::RuleSet => Record::RuleSet(read_rule_set(&mut r)?),
        RecordKind::Transition => Record::Transition(read_transition(&mut r)?),
        RecordKind::TransitionRule => Record::TransitionRule(read_transition_rule(&mut r)?),
    };
    Ok(record)
}

/// Decode a blob that must hold a rule set.
pub fn decode_rule_set(blob: &[u8]) -> CodecResult<RuleSet> {
    match decode_record(blob)? {
        Record::RuleSet(rules) => Ok(rules),
        other => Err(CodecError::UnexpectedRecord {
            expected: RecordKind::RuleSet.name(),
            actual: other.kind().name(),
        }),
    }
}

fn read_utc_offset(r: &mut ByteReader<'_>) -> CodecResult<UtcOffset> {
    Ok(UtcOffset::from_total_seconds(read_offset(r)?)?)
}

fn read_count(r: &mut ByteReader<'_>, what: &'static str) -> CodecResult<usize> {
    let count = r.read_i32()?;
    usize::try_from(count).map_err(|_| CodecError::InvalidLength {
        what,
        length: i64::from(count),
    })
}

// ---------------------------------------------------------------------------
// Rule set
// ---------------------------------------------------------------------------

fn write_rule_set(buf: &mut Vec<u8>, rules: &RuleSet) {
    buf.put_i32(rules.standard_transitions().len() as i32);
    for &epoch in rules.standard_transitions() {
        write_epoch_second(buf, epoch);
    }
    for offset in rules.standard_offsets() {
        write_offset(buf, offset.total_seconds());
    }
    buf.put_i32(rules.savings_instant_transitions().len() as i32);
    for &epoch in rules.savings_instant_transitions() {
        write_epoch_second(buf, epoch);
    }
    for offset in rules.wall_offsets() {
        write_offset(buf, offset.total_seconds());
    }
    buf.put_i8(rules.transition_rules().len() as i8);
    for rule in rules.transition_rules() {
        write_transition_rule(buf, rule);
    }
}

fn read_rule_set(r: &mut ByteReader<'_>) -> CodecResult<RuleSet> {
    let (standard_transitions, standard_offsets) = read_history(r, "standard transition")?;
    let (savings_transitions, wall_offsets) = read_history(r, "savings transition")?;

    let rule_count = r.read_i8()?;
    let rule_count = usize::try_from(rule_count).map_err(|_| CodecError::InvalidLength {
        what: "transition rule",
        length: i64::from(rule_count),
    })?;
    let mut last_rules = Vec::with_capacity(rule_count);
    for _ in 0..rule_count {
        last_rules.push(read_transition_rule(r)?);
    }

    Ok(RuleSet::new(
        standard_transitions,
        standard_offsets,
        savings_transitions,
        wall_offsets,
        last_rules,
    )?)
}

/// Read a count, that many instants, and one more offset than instants.
fn read_history(
    r: &mut ByteReader<'_>,
    what: &'static str,
) -> CodecResult<(Vec<i64>, Vec<UtcOffset>)> {
    let count = read_count(r, what)?;
    // Every entry takes at least one byte; cap preallocation by what is left.
    let mut instants = Vec::with_capacity(count.min(r.remaining()));
    for _ in 0..count {
        instants.push(read_epoch_second(r)?);
    }
    let mut offsets = Vec::with_capacity((count + 1).min(r.remaining()));
    for _ in 0..=count {
        offsets.push(read_utc_offset(r)?);
    }
    Ok((instants, offsets))
}

// ---------------------------------------------------------------------------
// Absolute transition
// ---------------------------------------------------------------------------

fn write_transition(buf: &mut Vec<u8>, t: &AbsoluteTransition) {
    write_epoch_second(buf, t.epoch_second);
    write_offset(buf, t.offset_before.total_seconds());
    write_offset(buf, t.offset_after.total_seconds());
}

fn read_transition(r: &mut ByteReader<'_>) -> CodecResult<AbsoluteTransition> {
    let epoch_second = read_epoch_second(r)?;
    let before = read_utc_offset(r)?;
    let after = read_utc_offset(r)?;
    Ok(AbsoluteTransition::new(epoch_second, before, after))
}

// ---------------------------------------------------------------------------
// Recurring transition rule
//
// One packed 32-bit word, most significant field first:
//   month:4 | dom+32:6 | dow:3 | time:5 | definition:2 | std:8 | before:2 | after:2
// followed by raw i32 values for the fields that did not fit, in the order
// time, std, before, after.
// ---------------------------------------------------------------------------

const TIME_ESCAPE: u32 = 31;
const STD_ESCAPE: u32 = 255;
const SAVINGS_ESCAPE: u32 = 3;

/// Savings of 0, 30 or 60 minutes pack into two bits.
fn savings_code(offset: i32, standard: i32) -> u32 {
    match offset - standard {
        0 => 0,
        1800 => 1,
        3600 => 2,
        _ => SAVINGS_ESCAPE,
    }
}

fn write_transition_rule(buf: &mut Vec<u8>, rule: &RecurringTransitionRule) {
    let time_secs = rule.second_of_day();
    let std = rule.standard_offset().total_seconds();
    let before = rule.offset_before().total_seconds();
    let after = rule.offset_after().total_seconds();

    let time_code = if time_secs % 3600 == 0 {
        time_secs / 3600
    } else {
        TIME_ESCAPE
    };
    let std_code = if std % 900 == 0 {
        (std / 900 + 128) as u32
    } else {
        STD_ESCAPE
    };
    let before_code = savings_code(before, std);
    let after_code = savings_code(after, std);
    let dow_code = rule.day_of_week().map_or(0, |d| d.number_from_monday());
    let dom_code = (i32::from(rule.day_of_month_indicator()) + 32) as u32;

    let packed = (rule.month().number_from_month() << 28)
        | (dom_code << 22)
        | (dow_code << 19)
        | (time_code << 14)
        | (rule.time_definition().ordinal() << 12)
        | (std_code << 4)
        | (before_code << 2)
        | after_code;
    buf.put_u32(packed);

    if time_code == TIME_ESCAPE {
        buf.put_i32(time_secs as i32);
    }
    if std_code == STD_ESCAPE {
        buf.put_i32(std);
    }
    if before_code == SAVINGS_ESCAPE {
        buf.put_i32(before);
    }
    if after_code == SAVINGS_ESCAPE {
        buf.put_i32(after);
    }
}

fn read_transition_rule(r: &mut ByteReader<'_>) -> CodecResult<RecurringTransitionRule> {
    let packed = r.read_i32()? as u32;
    let month = month_from_number(packed >> 28)?;
    let dom = ((packed >> 22) & 63) as i32 - 32;
    let dow_code = (packed >> 19) & 7;
    let time_code = (packed >> 14) & 31;
    let definition = TimeDefinition::from_ordinal((packed >> 12) & 3)?;
    let std_code = (packed >> 4) & 255;
    let before_code = (packed >> 2) & 3;
    let after_code = packed & 3;

    let day_of_week = match dow_code {
        0 => None,
        n => Some(weekday_from_iso(n)?),
    };

    let (local_time, end_of_day) = match time_code {
        TIME_ESCAPE => {
            let secs = r.read_i32()?;
            if secs == 86_400 {
                (NaiveTime::MIN, true)
            } else {
                let time = u32::try_from(secs)
                    .ok()
                    .and_then(|s| NaiveTime::from_num_seconds_from_midnight_opt(s, 0))
                    .ok_or(TypeError::InvalidTime(i64::from(secs)))?;
                (time, false)
            }
        }
        24 => (NaiveTime::MIN, true),
        hour if hour < 24 => {
            let time = NaiveTime::from_hms_opt(hour, 0, 0)
                .ok_or(TypeError::InvalidTime(i64::from(hour) * 3600))?;
            (time, false)
        }
        other => return Err(TypeError::InvalidTime(i64::from(other) * 3600).into()),
    };

    let std = if std_code == STD_ESCAPE {
        r.read_i32()?
    } else {
        (std_code as i32 - 128) * 900
    };
    let before = if before_code == SAVINGS_ESCAPE {
        r.read_i32()?
    } else {
        std + before_code as i32 * 1800
    };
    let after = if after_code == SAVINGS_ESCAPE {
        r.read_i32()?
    } else {
        std + after_code as i32 * 1800
    };

    Ok(RecurringTransitionRule::new(
        month,
        dom as i8,
        day_of_week,
        local_time,
        end_of_day,
        definition,
        UtcOffset::from_total_seconds(std)?,
        UtcOffset::from_total_seconds(before)?,
        UtcOffset::from_total_seconds(after)?,
    )?)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use tzdb_types::{Month, Weekday};

    use super::*;

    fn off(hours: i32) -> UtcOffset {
        UtcOffset::from_hours_minutes(hours, 0).unwrap()
    }

    fn eu_spring() -> RecurringTransitionRule {
        RecurringTransitionRule::new(
            Month::March,
            25,
            Some(Weekday::Sun),
            NaiveTime::from_hms_opt(1, 0, 0).unwrap(),
            false,
            TimeDefinition::Utc,
            off(1),
            off(1),
            off(2),
        )
        .unwrap()
    }

    fn eu_autumn() -> RecurringTransitionRule {
        RecurringTransitionRule::new(
            Month::October,
            25,
            Some(Weekday::Sun),
            NaiveTime::from_hms_opt(1, 0, 0).unwrap(),
            false,
            TimeDefinition::Utc,
            off(1),
            off(2),
            off(1),
        )
        .unwrap()
    }

    fn paris_like() -> RuleSet {
        let lmt = UtcOffset::from_total_seconds(561).unwrap();
        RuleSet::from_transitions(
            lmt,
            lmt,
            &[AbsoluteTransition::new(-2_486_592_561, lmt, off(0))],
            &[
                AbsoluteTransition::new(-2_486_592_561, lmt, off(0)),
                AbsoluteTransition::new(-1_855_958_901, off(0), off(1)),
                AbsoluteTransition::new(354_675_600, off(1), off(2)),
            ],
            vec![eu_spring(), eu_autumn()],
        )
        .unwrap()
    }

    #[test]
    fn type_byte_roundtrip() {
        for kind in [RecordKind::RuleSet, RecordKind::Transition, RecordKind::TransitionRule] {
            assert_eq!(RecordKind::from_type_byte(kind.type_byte()), Some(kind));
        }
        assert!(RecordKind::from_type_byte(0).is_none());
        assert!(RecordKind::from_type_byte(4).is_none());
        assert!(RecordKind::from_type_byte(255).is_none());
    }

    #[test]
    fn rule_set_roundtrip() {
        let rules = paris_like();
        let blob = encode_rule_set(&rules);
        assert_eq!(blob[0], 1);
        assert_eq!(decode_rule_set(&blob).unwrap(), rules);
        assert_eq!(encode_record(&Record::RuleSet(rules)), blob);
    }

    #[test]
    fn fixed_rule_set_bytes() {
        let blob = encode_rule_set(&RuleSet::fixed(off(0)));
        assert_eq!(blob, vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn transition_record_bytes() {
        let t = AbsoluteTransition::new(0, off(1), off(2));
        let blob = encode_record(&Record::Transition(t));
        let mut expected = vec![2];
        write_epoch_second(&mut expected, 0);
        expected.extend_from_slice(&[4, 8]);
        assert_eq!(blob, expected);
        assert_eq!(decode_record(&blob).unwrap(), Record::Transition(t));
    }

    #[test]
    fn transition_rule_packed_word() {
        let blob = encode_record(&Record::TransitionRule(eu_spring()));
        let expected: u32 = (3 << 28) | (57 << 22) | (7 << 19) | (1 << 14) | (132 << 4) | 2;
        assert_eq!(blob[0], 3);
        assert_eq!(&blob[1..], &expected.to_be_bytes());
    }

    #[test]
    fn transition_rule_escapes_roundtrip() {
        let odd = UtcOffset::from_total_seconds(-968).unwrap();
        let rule = RecurringTransitionRule::new(
            Month::April,
            -8,
            None,
            NaiveTime::from_hms_opt(2, 30, 15).unwrap(),
            false,
            TimeDefinition::Standard,
            odd,
            UtcOffset::from_total_seconds(-968 + 1200).unwrap(),
            off(5),
        )
        .unwrap();
        let blob = encode_record(&Record::TransitionRule(rule.clone()));
        // Packed word plus four escaped values.
        assert_eq!(blob.len(), 1 + 4 + 16);
        assert_eq!(decode_record(&blob).unwrap(), Record::TransitionRule(rule));
    }

    #[test]
    fn end_of_day_roundtrip() {
        let rule = RecurringTransitionRule::new(
            Month::December,
            -1,
            Some(Weekday::Sat),
            NaiveTime::MIN,
            true,
            TimeDefinition::Wall,
            off(-3),
            off(-2),
            off(-3),
        )
        .unwrap();
        let blob = encode_record(&Record::TransitionRule(rule.clone()));
        assert_eq!(blob.len(), 5);
        assert_eq!(decode_record(&blob).unwrap(), Record::TransitionRule(rule));
    }

    #[test]
    fn unknown_tag_fails() {
        let err = decode_record(&[9, 0, 0]).unwrap_err();
        assert_eq!(err, CodecError::UnknownRecordType(9));
        assert_eq!(err.to_string(), "unknown serialized type: 9");
    }

    #[test]
    fn empty_blob_is_truncated() {
        assert!(matches!(decode_record(&[]), Err(CodecError::Truncated { .. })));
    }

    #[test]
    fn truncated_rule_set_fails() {
        let blob = encode_rule_set(&paris_like());
        for cut in [1, 5, blob.len() / 2, blob.len() - 1] {
            assert!(
                matches!(decode_rule_set(&blob[..cut]), Err(CodecError::Truncated { .. })),
                "cut at {cut}"
            );
        }
    }

    #[test]
    fn negative_count_fails() {
        let mut blob = vec![1];
        blob.extend_from_slice(&(-1i32).to_be_bytes());
        let err = decode_rule_set(&blob).unwrap_err();
        assert!(matches!(err, CodecError::InvalidLength { length: -1, .. }));
    }

    #[test]
    fn out_of_range_offset_fails() {
        // 100 quarter hours is 25 hours.
        let blob = vec![1, 0, 0, 0, 0, 100];
        let err = decode_rule_set(&blob).unwrap_err();
        assert_eq!(err, CodecError::Invalid(TypeError::OffsetOutOfRange(90_000)));
    }

    #[test]
    fn invalid_month_fails() {
        let mut blob = vec![3];
        blob.extend_from_slice(&((13u32 << 28) | (33 << 22) | (128 << 4)).to_be_bytes());
        let err = decode_record(&blob).unwrap_err();
        assert_eq!(err, CodecError::Invalid(TypeError::InvalidMonth(13)));
    }

    #[test]
    fn invalid_time_definition_fails() {
        let mut blob = vec![3];
        blob.extend_from_slice(&((1u32 << 28) | (33 << 22) | (3 << 12) | (128 << 4)).to_be_bytes());
        let err = decode_record(&blob).unwrap_err();
        assert_eq!(err, CodecError::Invalid(TypeError::InvalidTimeDefinition(3)));
    }

    #[test]
    fn decode_rule_set_rejects_other_records() {
        let blob = encode_record(&Record::Transition(AbsoluteTransition::new(0, off(0), off(1))));
        let err = decode_rule_set(&blob).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnexpectedRecord {
                expected: "rule set",
                actual: "transition",
            }
        );
    }

    #[test]
    fn decoding_is_deterministic() {
        let blob = encode_rule_set(&paris_like());
        assert_eq!(decode_rule_set(&blob).unwrap(), decode_rule_set(&blob).unwrap());
    }

    #[test]
    fn trailing_bytes_ignored() {
        let mut blob = encode_rule_set(&RuleSet::fixed(off(2)));
        blob.extend_from_slice(&[0xAA, 0xBB]);
        assert_eq!(decode_rule_set(&blob).unwrap(), RuleSet::fixed(off(2)));
    }

    fn offset_strategy() -> impl Strategy<Value = UtcOffset> {
        prop_oneof![
            (-72i32..=72).prop_map(|q| q * 900),
            -64_800i32..=64_800,
        ]
        .prop_map(|s| UtcOffset::from_total_seconds(s).unwrap())
    }

    proptest! {
        #[test]
        fn arbitrary_history_roundtrip(
            base in offset_strategy(),
            history in prop::collection::vec((any::<i64>(), offset_strategy()), 0..16),
        ) {
            let mut before = base;
            let transitions: Vec<AbsoluteTransition> = history
                .into_iter()
                .map(|(epoch, after)| {
                    let t = AbsoluteTransition::new(epoch, before, after);
                    before = after;
                    t
                })
                .collect();
            let rules = RuleSet::from_transitions(base, base, &transitions, &transitions, vec![])
                .unwrap();
            let blob = encode_rule_set(&rules);
            let decoded = decode_rule_set(&blob).unwrap();
            prop_assert_eq!(&decoded, &rules);
            prop_assert_eq!(encode_rule_set(&decoded), blob);
        }
    }
}
