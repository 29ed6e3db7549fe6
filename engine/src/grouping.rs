//! Partitioning of a sensor's observations into calendar-day buckets.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::CompactError;
use crate::model::{Bucket, Observation};

/// A validated `xsd:dateTime` lexical form.
///
/// Ordering follows the UTC instant; values without an offset are taken
/// as-is. `24:00:00` is the first instant of the following day but keeps
/// the written calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    instant: NaiveDateTime,
    day: NaiveDate,
}

impl Timestamp {
    /// Parses `YYYY-MM-DDThh:mm:ss[.f][Z|(+|-)hh:mm]`. Returns `None` for
    /// anything else, including date-only values.
    #[must_use]
    pub fn parse(lexical: &str) -> Option<Self> {
        let (date, rest) = lexical.split_once('T')?;
        let day = parse_date(date)?;
        let (clock, offset_secs) = split_offset(rest)?;
        let (clock, end_of_day) = match clock.strip_prefix("24:00:00") {
            Some(fraction) if is_zero_fraction(fraction) => ("00:00:00", true),
            Some(_) => return None,
            None => (clock, false),
        };
        let time = parse_clock(clock)?;
        let mut instant = NaiveDateTime::new(day, time);
        if end_of_day {
            instant = instant.checked_add_signed(Duration::days(1))?;
        }
        let instant = instant.checked_sub_signed(Duration::seconds(offset_secs))?;
        Some(Self { instant, day })
    }

    /// The calendar date as written, without zone conversion.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.day
    }

    /// The UTC instant used for ordering.
    #[must_use]
    pub fn instant(&self) -> NaiveDateTime {
        self.instant
    }
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    let b = date.as_bytes();
    let shaped = b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && [0, 1, 2, 3, 5, 6, 8, 9].iter().all(|&i| b[i].is_ascii_digit());
    shaped
        .then(|| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .flatten()
}

fn parse_clock(clock: &str) -> Option<NaiveTime> {
    let b = clock.as_bytes();
    let shaped = b.len() >= 8
        && b[2] == b':'
        && b[5] == b':'
        && [0, 1, 3, 4, 6, 7].iter().all(|&i| b[i].is_ascii_digit())
        && (b.len() == 8 || is_fraction(&clock[8..]));
    shaped
        .then(|| NaiveTime::parse_from_str(clock, "%H:%M:%S%.f").ok())
        .flatten()
}

fn is_fraction(s: &str) -> bool {
    s.strip_prefix('.')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

fn is_zero_fraction(s: &str) -> bool {
    s.is_empty() || (is_fraction(s) && s[1..].bytes().all(|b| b == b'0'))
}

/// Splits the time part from its zone designator, returning the offset in
/// seconds east of UTC.
fn split_offset(rest: &str) -> Option<(&str, i64)> {
    if let Some(clock) = rest.strip_suffix('Z') {
        return Some((clock, 0));
    }
    let Some(at) = rest.len().checked_sub(6) else {
        return Some((rest, 0));
    };
    let Some(zone) = rest.get(at..) else {
        return None;
    };
    let sign = match zone.as_bytes()[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return Some((rest, 0)),
    };
    let z = zone.as_bytes();
    if z[3] != b':' || ![1, 2, 4, 5].iter().all(|&i| z[i].is_ascii_digit()) {
        return None;
    }
    let hours = i64::from(z[1] - b'0') * 10 + i64::from(z[2] - b'0');
    let minutes = i64::from(z[4] - b'0') * 10 + i64::from(z[5] - b'0');
    if hours > 14 || minutes > 59 || (hours == 14 && minutes > 0) {
        return None;
    }
    Some((&rest[..at], sign * (hours * 3600 + minutes * 60)))
}

/// The calendar date written in a timestamp's date component.
///
/// No time-zone conversion happens: `2024-01-01T23:30:00-05:00` belongs to
/// 2024-01-01. Returns `None` unless the whole value is a valid
/// `xsd:dateTime`.
#[must_use]
pub fn calendar_day(time: &str) -> Option<NaiveDate> {
    Timestamp::parse(time).map(|t| t.day())
}

/// Splits a sensor's observations into one bucket per calendar day.
///
/// Each time is parsed once. Within a bucket observations are ordered by
/// instant, then lexical form, then id; buckets come back ascending by day.
///
/// # Errors
///
/// Returns [`CompactError::MalformedTimestamp`] for the first observation,
/// in input order, whose time is not a valid `xsd:dateTime`.
pub fn group_by_day(observations: Vec<Observation>) -> Result<Vec<Bucket>, CompactError> {
    let mut keyed = Vec::with_capacity(observations.len());
    for observation in observations {
        let Some(timestamp) = Timestamp::parse(&observation.time) else {
            return Err(CompactError::MalformedTimestamp {
                observation: observation.id,
                time: observation.time,
            });
        };
        keyed.push((timestamp, observation));
    }
    keyed.sort_by(|(a, x), (b, y)| {
        a.cmp(b)
            .then_with(|| x.time.cmp(&y.time))
            .then_with(|| x.id.cmp(&y.id))
    });

    let mut buckets: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
    for (timestamp, observation) in keyed {
        let day = timestamp.day();
        match buckets.get_mut(&day) {
            Some(bucket) => bucket.push(observation),
            None => {
                buckets.insert(day, Bucket::new(day, observation));
            }
        }
    }
    Ok(buckets.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Term;

    fn obs(id: &str, time: &str) -> Observation {
        Observation {
            id: id.into(),
            time: time.into(),
            value: "1".into(),
            observed_property: Term::iri("http://ex.org/P1"),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn reads_date_component_verbatim() {
        assert_eq!(calendar_day("2024-01-01T08:00:00"), day(2024, 1, 1));
        assert_eq!(calendar_day("2024-01-01T23:30:00-05:00"), day(2024, 1, 1));
        assert_eq!(calendar_day("2024-01-01T24:00:00"), day(2024, 1, 1));
        assert_eq!(calendar_day("2024-01-01"), None);
        assert_eq!(calendar_day("yesterday"), None);
        assert_eq!(calendar_day("2024-13-01T00:00:00"), None);
    }

    #[test]
    fn splits_on_day_boundaries_preserving_order() {
        let buckets = group_by_day(vec![
            obs("a", "2024-01-01T08:00:00"),
            obs("b", "2024-01-01T09:00:00"),
            obs("c", "2024-01-02T08:00:00"),
        ]);
        let Ok(buckets) = buckets else {
            panic!("well-formed times must group");
        };
        assert_eq!(buckets.len(), 2);
        let ids: Vec<_> = buckets[0].observations().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(buckets[1].first().id, "c");
        assert_eq!(Some(buckets[1].day()), day(2024, 1, 2));
    }

    #[test]
    fn buckets_are_sorted_by_day() {
        // Offsets can put a later calendar date first in instant order.
        let Ok(buckets) = group_by_day(vec![
            obs("late", "2024-01-02T00:30:00+02:00"),
            obs("early", "2024-01-01T23:00:00Z"),
        ]) else {
            panic!("well-formed times must group");
        };
        let days: Vec<_> = buckets.iter().map(|b| Some(b.day())).collect();
        assert_eq!(days, [day(2024, 1, 1), day(2024, 1, 2)]);
    }

    #[test]
    fn malformed_time_names_the_observation() {
        let err = group_by_day(vec![obs("a", "2024-01-01T08:00:00"), obs("bad", "noon")]);
        match err {
            Err(CompactError::MalformedTimestamp { observation, time }) => {
                assert_eq!(observation, "bad");
                assert_eq!(time, "noon");
            }
            other => panic!("expected malformed timestamp, got {other:?}"),
        }
    }

    #[test]
    fn offsets_order_by_instant() {
        let early = Timestamp::parse("2024-01-01T10:00:00+02:00");
        let late = Timestamp::parse("2024-01-01T09:00:00Z");
        assert!(early.is_some() && early < late);
        assert!(Timestamp::parse("2024-01-01T08:00:00.250").is_some());
    }

    #[test]
    fn end_of_day_sorts_after_the_rest_of_its_date() {
        let Ok(buckets) = group_by_day(vec![
            obs("midnight", "2024-01-01T24:00:00"),
            obs("morning", "2024-01-01T08:00:00"),
        ]) else {
            panic!("24:00:00 is a valid time");
        };
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].first().id, "morning");
        assert_eq!(buckets[0].last().id, "midnight");
        assert_eq!(Some(buckets[0].day()), day(2024, 1, 1));
        assert_eq!(
            Timestamp::parse("2024-01-01T24:00:00").map(|t| t.instant()),
            Timestamp::parse("2024-01-02T00:00:00").map(|t| t.instant())
        );
        assert!(Timestamp::parse("2024-01-01T24:00:01").is_none());
    }

    #[test]
    fn rejects_values_that_are_not_full_datetimes() {
        for bad in [
            "2024-01-01Tnoon",
            "2024-01-01T8:00:00",
            "2024-01-01T08:00:00.",
            "2024-01-01T08:00:00+2:00",
            "2024-01-01T08:00:00+15:00",
            "2024-1-01T08:00:00",
            "2024-01-01",
        ] {
            assert!(Timestamp::parse(bad).is_none(), "{bad} must be rejected");
        }
    }

    #[test]
    fn bad_time_part_is_malformed() {
        let err = group_by_day(vec![obs("a", "2024-01-01Tnoon")]);
        assert!(matches!(
            err,
            Err(CompactError::MalformedTimestamp { ref time, .. }) if time == "2024-01-01Tnoon"
        ));
    }

    #[test]
    fn empty_input_yields_no_buckets() {
        assert!(matches!(group_by_day(Vec::new()), Ok(b) if b.is_empty()));
    }
}
