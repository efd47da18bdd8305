//! ISO-8601 timestamp grammar.
//!
//! Encoding always emits `YYYY-MM-DDTHH:MM:SS.mmmZ`. Decoding requires a
//! date, the `T` separator, an hour and a timezone; minutes, seconds and the
//! fraction are optional and default to zero. Sub-millisecond digits are
//! truncated.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::domain::message::Timestamp;

/// Formats a timestamp in the canonical wire form.
pub(crate) fn format(timestamp: &Timestamp) -> String {
    timestamp
        .instant()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// Parses the wire form of a timestamp.
pub(crate) fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
    let (date, time) = raw
        .split_once('T')
        .ok_or_else(|| "missing date/time separator `T`".to_owned())?;
    let date = parse_date(date)?;
    let (clock, offset) = split_offset(time)?;
    let clock = parse_clock(clock)?;

    offset
        .from_local_datetime(&date.and_time(clock))
        .single()
        .map(|instant| instant.with_timezone(&Utc))
        .ok_or_else(|| format!("{raw:?} is not a representable instant"))
}

fn parse_date(date: &str) -> Result<NaiveDate, String> {
    let well_formed = date.len() == 10
        && date.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(format!("date {date:?} is not YYYY-MM-DD"));
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| format!("date {date:?}: {e}"))
}

fn split_offset(time: &str) -> Result<(&str, FixedOffset), String> {
    if let Some(clock) = time.strip_suffix(['Z', 'z']) {
        let utc = FixedOffset::east_opt(0).ok_or_else(|| "invalid UTC offset".to_owned())?;
        return Ok((clock, utc));
    }
    let sign_at = time
        .rfind(['+', '-'])
        .ok_or_else(|| "missing timezone".to_owned())?;
    let (clock, offset) = time.split_at(sign_at);
    Ok((clock, parse_offset(offset)?))
}

fn parse_offset(offset: &str) -> Result<FixedOffset, String> {
    let (sign, digits) = offset.split_at(1);
    if !digits.is_ascii() {
        return Err(format!("timezone {offset:?} is not ±HH[:MM]"));
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits, "00"),
        4 => digits.split_at(2),
        5 if digits.as_bytes()[2] == b':' => (&digits[..2], &digits[3..]),
        _ => return Err(format!("timezone {offset:?} is not ±HH[:MM]")),
    };
    let seconds = two_digits(hours, 23, "timezone hour")? * 3600
        + two_digits(minutes, 59, "timezone minute")? * 60;
    let seconds = i32::try_from(seconds).map_err(|e| e.to_string())?;
    let seconds = if sign == "-" { -seconds } else { seconds };
    FixedOffset::east_opt(seconds).ok_or_else(|| format!("timezone {offset:?} is out of range"))
}

fn parse_clock(clock: &str) -> Result<NaiveTime, String> {
    if clock.is_empty() {
        return Err("missing hour".to_owned());
    }
    let mut parts = clock.splitn(3, ':');
    let hour = two_digits(parts.next().unwrap_or_default(), 23, "hour")?;
    let minute = parts
        .next()
        .map_or(Ok(0), |m| two_digits(m, 59, "minute"))?;
    let (second, nanos) = match parts.next() {
        None => (0, 0),
        Some(seconds) => {
            let (whole, fraction) = match seconds.split_once(['.', ',']) {
                Some((whole, fraction)) => (whole, Some(fraction)),
                None => (seconds, None),
            };
            (
                two_digits(whole, 59, "second")?,
                fraction.map_or(Ok(0), parse_fraction)?,
            )
        }
    };
    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
        .ok_or_else(|| format!("time {clock:?} is out of range"))
}

/// Milliseconds of a decimal fraction, expressed in nanoseconds.
fn parse_fraction(fraction: &str) -> Result<u32, String> {
    if fraction.is_empty() || fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("fraction {fraction:?} is not 1 to 9 digits"));
    }
    let millis: String = fraction.chars().chain("00".chars()).take(3).collect();
    millis
        .parse::<u32>()
        .map(|ms| ms * 1_000_000)
        .map_err(|e| e.to_string())
}

fn two_digits(raw: &str, max: u32, what: &str) -> Result<u32, String> {
    if raw.len() != 2 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("{what} {raw:?} is not two digits"));
    }
    let value = raw.parse::<u32>().map_err(|e| e.to_string())?;
    if value > max {
        return Err(format!("{what} {value} exceeds {max}"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap() + chrono::Duration::milliseconds(ms)
    }

    #[test]
    fn test_parses_full_form() {
        assert_eq!(
            parse("2018-12-14T09:41:51.541Z").unwrap(),
            utc(2018, 12, 14, 9, 41, 51, 541)
        );
    }

    #[test]
    fn test_milliseconds_and_seconds_are_optional() {
        assert_eq!(
            parse("2018-12-14T09:41:51Z").unwrap(),
            utc(2018, 12, 14, 9, 41, 51, 0)
        );
        assert_eq!(
            parse("2018-12-14T09:41Z").unwrap(),
            utc(2018, 12, 14, 9, 41, 0, 0)
        );
        assert_eq!(
            parse("2018-12-14T09Z").unwrap(),
            utc(2018, 12, 14, 9, 0, 0, 0)
        );
    }

    #[test]
    fn test_offsets_are_normalized_to_utc() {
        assert_eq!(
            parse("2018-12-14T10:41:51.5+01:00").unwrap(),
            utc(2018, 12, 14, 9, 41, 51, 500)
        );
        assert_eq!(
            parse("2018-12-14T04:41:51-0500").unwrap(),
            utc(2018, 12, 14, 9, 41, 51, 0)
        );
    }

    #[test]
    fn test_sub_millisecond_digits_are_truncated() {
        assert_eq!(
            parse("2018-12-14T09:41:51.541999Z").unwrap(),
            utc(2018, 12, 14, 9, 41, 51, 541)
        );
    }

    #[test]
    fn test_rejects_incomplete_forms() {
        for raw in [
            "",
            "2018-12-14",
            "2018-12-14T",
            "2018-12-14TZ",
            "2018-12-14T09:41:51",
            "2018-12-14T09:41:51.Z",
            "18-12-14T09:41Z",
            "2018-12-14T9:41Z",
            "2018-12-14T25:00Z",
            "2018-12-14T09:41:51+1",
        ] {
            assert!(parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_format_is_canonical() {
        let timestamp = Timestamp::new(utc(2018, 12, 14, 9, 41, 51, 0)).unwrap();

        assert_eq!(format(&timestamp), "2018-12-14T09:41:51.000Z");
    }
}
