//! Parsing of FEEL temporal and duration literals.
//!
//! Used by the conversion built-ins (`date(..)`, `time(..)`, `duration(..)`).
//! Parsers are lenient Option-returners; the built-ins turn `None` into the
//! appropriate error value. Offsets are numeric (`Z`, `+02:00`, `+0200`);
//! named zone ids are not supported.

use crate::value::{DayTimeDuration, YearMonthDuration, ZonedTime};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

pub(crate) enum ParsedTime {
    Local(NaiveTime),
    Zoned(ZonedTime),
}

pub(crate) enum ParsedDateTime {
    Local(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

pub(crate) enum ParsedDuration {
    YearMonth(YearMonthDuration),
    DayTime(DayTimeDuration),
}

pub(crate) fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

pub(crate) fn parse_time(input: &str) -> Option<ParsedTime> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    let (time_part, offset) = parse_offset(s)?;
    let time = NaiveTime::parse_from_str(time_part, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(time_part, "%H:%M:%S"))
        .or_else(|_| NaiveTime::parse_from_str(time_part, "%H:%M"))
        .ok()?;

    Some(match offset {
        Some(seconds) => ParsedTime::Zoned(ZonedTime::new(time, FixedOffset::east_opt(seconds)?)),
        None => ParsedTime::Local(time),
    })
}

pub(crate) fn parse_date_time(input: &str) -> Option<ParsedDateTime> {
    let s = input.trim();
    let (date_part, time_part) = s.split_once('T')?;
    let date = parse_date(date_part)?;

    Some(match parse_time(time_part)? {
        ParsedTime::Local(time) => ParsedDateTime::Local(NaiveDateTime::new(date, time)),
        ParsedTime::Zoned(zoned) => {
            let offset = zoned.offset;
            let local = NaiveDateTime::new(date, zoned.time);
            ParsedDateTime::Zoned(offset.from_local_datetime(&local).single()?)
        }
    })
}

pub(crate) fn parse_duration(input: &str) -> Option<ParsedDuration> {
    let s = input.trim();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let s = s.strip_prefix('P')?;
    if s.is_empty() {
        return None;
    }

    let (date_part, time_part) = match s.split_once('T') {
        Some((date, time)) if !time.is_empty() => (date, Some(time)),
        Some(_) => return None,
        None => (s, None),
    };

    // year-month form: only Y and M designators, no time component
    if time_part.is_none() && (date_part.contains('Y') || date_part.contains('M')) {
        let mut months: i64 = 0;
        for (number, designator) in split_fields(date_part)? {
            let n: i64 = number.parse().ok()?;
            match designator {
                'Y' => months = months.checked_add(n.checked_mul(12)?)?,
                'M' => months = months.checked_add(n)?,
                _ => return None,
            }
        }
        if negative {
            months = -months;
        }
        return Some(ParsedDuration::YearMonth(YearMonthDuration::from_months(
            months,
        )));
    }

    // day-time form: D designator, then H/M/S after 'T'
    let mut millis: i64 = 0;
    for (number, designator) in split_fields(date_part)? {
        let n: i64 = number.parse().ok()?;
        match designator {
            'D' => millis = millis.checked_add(n.checked_mul(86_400_000)?)?,
            _ => return None,
        }
    }
    if let Some(time_part) = time_part {
        for (number, designator) in split_fields(time_part)? {
            match designator {
                'H' => {
                    let n: i64 = number.parse().ok()?;
                    millis = millis.checked_add(n.checked_mul(3_600_000)?)?;
                }
                'M' => {
                    let n: i64 = number.parse().ok()?;
                    millis = millis.checked_add(n.checked_mul(60_000)?)?;
                }
                'S' => {
                    millis = millis.checked_add(parse_seconds_millis(&number)?)?;
                }
                _ => return None,
            }
        }
    }
    if negative {
        millis = -millis;
    }
    Some(ParsedDuration::DayTime(DayTimeDuration::new(
        Duration::milliseconds(millis),
    )))
}

/// Split `"1Y2M"` into `[("1", 'Y'), ("2", 'M')]`. At least one field is
/// required unless the part is empty.
fn split_fields(part: &str) -> Option<Vec<(String, char)>> {
    let mut fields = Vec::new();
    let mut number = String::new();
    for c in part.chars() {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
        } else if c.is_ascii_uppercase() {
            if number.is_empty() {
                return None;
            }
            fields.push((std::mem::take(&mut number), c));
        } else {
            return None;
        }
    }
    if !number.is_empty() {
        return None;
    }
    Some(fields)
}

/// Seconds field with up to millisecond precision, e.g. `"1.5"` -> 1500.
fn parse_seconds_millis(number: &str) -> Option<i64> {
    let (whole, frac) = number
        .split_once('.')
        .map(|(w, f)| (w, Some(f)))
        .unwrap_or((number, None));
    let seconds: i64 = whole.parse().ok()?;
    let mut millis = seconds.checked_mul(1_000)?;
    if let Some(frac) = frac {
        let digits: String = frac.chars().take(3).collect();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let padded = format!("{:0<3}", digits);
        millis = millis.checked_add(padded.parse().ok()?)?;
    }
    Some(millis)
}

fn parse_offset(rest: &str) -> Option<(&str, Option<i32>)> {
    if let Some(stripped) = rest.strip_suffix('Z') {
        return Some((stripped, Some(0)));
    }

    if let Some(pos) = rest.rfind(['+', '-']) {
        let (time, tz) = rest.split_at(pos);
        if tz.len() >= 6 && tz.as_bytes().get(3) == Some(&b':') {
            let sign = if tz.starts_with('-') { -1 } else { 1 };
            let hours: i32 = tz[1..3].parse().ok()?;
            let minutes: i32 = tz[4..6].parse().ok()?;
            return Some((time, Some(sign * (hours * 3600 + minutes * 60))));
        }
        if tz.len() == 5 {
            let sign = if tz.starts_with('-') { -1 } else { 1 };
            let hours: i32 = tz[1..3].parse().ok()?;
            let minutes: i32 = tz[3..5].parse().ok()?;
            return Some((time, Some(sign * (hours * 3600 + minutes * 60))));
        }
    }

    Some((rest, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-29"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_parse_time_local_and_zoned() {
        match parse_time("10:30:00").unwrap() {
            ParsedTime::Local(t) => assert_eq!(t, NaiveTime::from_hms_opt(10, 30, 0).unwrap()),
            ParsedTime::Zoned(_) => panic!("expected local time"),
        }
        match parse_time("10:30:00+02:00").unwrap() {
            ParsedTime::Zoned(t) => {
                assert_eq!(t.time, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
                assert_eq!(t.offset.local_minus_utc(), 7200);
            }
            ParsedTime::Local(_) => panic!("expected zoned time"),
        }
        match parse_time("10:30:00Z").unwrap() {
            ParsedTime::Zoned(t) => assert_eq!(t.offset.local_minus_utc(), 0),
            ParsedTime::Local(_) => panic!("expected zoned time"),
        }
    }

    #[test]
    fn test_parse_date_time() {
        match parse_date_time("2021-01-02T10:30:00").unwrap() {
            ParsedDateTime::Local(dt) => {
                assert_eq!(
                    dt,
                    NaiveDate::from_ymd_opt(2021, 1, 2)
                        .unwrap()
                        .and_hms_opt(10, 30, 0)
                        .unwrap()
                );
            }
            ParsedDateTime::Zoned(_) => panic!("expected local date time"),
        }
        match parse_date_time("2021-01-02T10:30:00+01:00").unwrap() {
            ParsedDateTime::Zoned(dt) => assert_eq!(dt.offset().local_minus_utc(), 3600),
            ParsedDateTime::Local(_) => panic!("expected zoned date time"),
        }
    }

    #[test]
    fn test_parse_year_month_duration() {
        match parse_duration("P1Y6M").unwrap() {
            ParsedDuration::YearMonth(d) => assert_eq!(d.total_months(), 18),
            ParsedDuration::DayTime(_) => panic!("expected year-month duration"),
        }
        match parse_duration("-P2M").unwrap() {
            ParsedDuration::YearMonth(d) => assert_eq!(d.total_months(), -2),
            ParsedDuration::DayTime(_) => panic!("expected year-month duration"),
        }
    }

    #[test]
    fn test_parse_day_time_duration() {
        match parse_duration("P1DT2H3M4.5S").unwrap() {
            ParsedDuration::DayTime(d) => {
                assert_eq!(d.total_millis(), 86_400_000 + 7_200_000 + 180_000 + 4_500);
            }
            ParsedDuration::YearMonth(_) => panic!("expected day-time duration"),
        }
        match parse_duration("PT30S").unwrap() {
            ParsedDuration::DayTime(d) => assert_eq!(d.total_millis(), 30_000),
            ParsedDuration::YearMonth(_) => panic!("expected day-time duration"),
        }
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("P").is_none());
        assert!(parse_duration("PT").is_none());
        assert!(parse_duration("P1Y2D").is_none());
        assert!(parse_duration("1Y").is_none());
        assert!(parse_duration("").is_none());
    }
}
