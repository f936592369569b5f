//! The fixed date/time shapes embedded in MT headers and trailers.
//!
//! Each wrapper keeps the raw wire text alongside the parsed value and a
//! `set` flag, because headers carry these fields optionally and a record
//! may be partially filled when decoding fails midway.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use swift_mt_diagnostics::TemporalError;

/// An `HHMM` time of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Time {
    /// Whether a value was decoded.
    pub set: bool,
    /// The wire text.
    pub raw: String,
    /// The parsed time.
    pub value: NaiveTime,
}

impl Default for Time {
    fn default() -> Self {
        Time {
            set: false,
            raw: String::new(),
            value: NaiveTime::MIN,
        }
    }
}

impl Time {
    /// Parse an `HHMM` time.
    pub fn parse(input: &str) -> Result<Time, TemporalError> {
        let value = NaiveTime::parse_from_str(input, "%H%M")
            .map_err(|_| TemporalError::Time(input.to_string()))?;
        Ok(Time {
            set: true,
            raw: input.to_string(),
            value,
        })
    }
}

/// An `MMDD` month and day, anchored to year zero like the original wire
/// format, which carries no year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Month {
    /// Whether a value was decoded.
    pub set: bool,
    /// The wire text.
    pub raw: String,
    /// The parsed month and day.
    pub value: NaiveDate,
}

impl Default for Month {
    fn default() -> Self {
        Month {
            set: false,
            raw: String::new(),
            value: NaiveDate::MIN,
        }
    }
}

impl Month {
    /// Parse an `MMDD` month/day.
    pub fn parse(input: &str) -> Result<Month, TemporalError> {
        let err = || TemporalError::Month(input.to_string());
        if input.len() != 4 || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let month: u32 = input[..2].parse().map_err(|_| err())?;
        let day: u32 = input[2..].parse().map_err(|_| err())?;
        let value = NaiveDate::from_ymd_opt(0, month, day).ok_or_else(err)?;
        Ok(Month {
            set: true,
            raw: input.to_string(),
            value,
        })
    }
}

/// A `YYMMDD` date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Date {
    /// Whether a value was decoded.
    pub set: bool,
    /// The wire text.
    pub raw: String,
    /// The parsed date.
    pub value: NaiveDate,
}

impl Default for Date {
    fn default() -> Self {
        Date {
            set: false,
            raw: String::new(),
            value: NaiveDate::MIN,
        }
    }
}

impl Date {
    /// Parse a `YYMMDD` date.
    pub fn parse(input: &str) -> Result<Date, TemporalError> {
        let value = NaiveDate::parse_from_str(input, "%y%m%d")
            .map_err(|_| TemporalError::Date(input.to_string()))?;
        Ok(Date {
            set: true,
            raw: input.to_string(),
            value,
        })
    }
}

/// A `YYMMDDHHMM` date-time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTime {
    /// Whether a value was decoded.
    pub set: bool,
    /// The wire text.
    pub raw: String,
    /// The parsed date-time.
    pub value: NaiveDateTime,
}

impl Default for DateTime {
    fn default() -> Self {
        DateTime {
            set: false,
            raw: String::new(),
            value: NaiveDateTime::MIN,
        }
    }
}

impl DateTime {
    /// Parse a `YYMMDDHHMM` date-time.
    pub fn parse(input: &str) -> Result<DateTime, TemporalError> {
        let value = NaiveDateTime::parse_from_str(input, "%y%m%d%H%M").map_err(|_| {
            TemporalError::DateTime {
                shape: "YYMMDDHHMM",
                raw: input.to_string(),
            }
        })?;
        Ok(DateTime {
            set: true,
            raw: input.to_string(),
            value,
        })
    }
}

/// A six-character `YYMMDD` date or a ten-character `YYMMDDHHMM`
/// date-time, as found in input and output references. A date-only value
/// parses to midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOrDateTime {
    /// Whether a value was decoded.
    pub set: bool,
    /// The wire text.
    pub raw: String,
    /// The parsed date-time.
    pub value: NaiveDateTime,
}

impl Default for DateOrDateTime {
    fn default() -> Self {
        DateOrDateTime {
            set: false,
            raw: String::new(),
            value: NaiveDateTime::MIN,
        }
    }
}

impl DateOrDateTime {
    /// Parse either shape, selected by length.
    pub fn parse(input: &str) -> Result<DateOrDateTime, TemporalError> {
        let value = if input.len() == 10 {
            NaiveDateTime::parse_from_str(input, "%y%m%d%H%M").map_err(|_| {
                TemporalError::DateTime {
                    shape: "YYMMDDHHMM",
                    raw: input.to_string(),
                }
            })?
        } else {
            NaiveDate::parse_from_str(input, "%y%m%d")
                .map_err(|_| TemporalError::Date(input.to_string()))?
                .and_time(NaiveTime::MIN)
        };
        Ok(DateOrDateTime {
            set: true,
            raw: input.to_string(),
            value,
        })
    }
}

/// A `YYMMDDHHMMSS` date-time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeSec {
    /// Whether a value was decoded.
    pub set: bool,
    /// The wire text.
    pub raw: String,
    /// The parsed date-time.
    pub value: NaiveDateTime,
}

impl Default for DateTimeSec {
    fn default() -> Self {
        DateTimeSec {
            set: false,
            raw: String::new(),
            value: NaiveDateTime::MIN,
        }
    }
}

impl DateTimeSec {
    /// Parse a `YYMMDDHHMMSS` date-time.
    pub fn parse(input: &str) -> Result<DateTimeSec, TemporalError> {
        let value = NaiveDateTime::parse_from_str(input, "%y%m%d%H%M%S").map_err(|_| {
            TemporalError::DateTime {
                shape: "YYMMDDHHMMSS",
                raw: input.to_string(),
            }
        })?;
        Ok(DateTimeSec {
            set: true,
            raw: input.to_string(),
            value,
        })
    }
}

/// A `YYMMDDHHMMSSmmm` date-time with milliseconds (fifteen digits on the
/// wire, no separator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeSecCent {
    /// Whether a value was decoded.
    pub set: bool,
    /// The wire text.
    pub raw: String,
    /// The parsed date-time.
    pub value: NaiveDateTime,
}

impl Default for DateTimeSecCent {
    fn default() -> Self {
        DateTimeSecCent {
            set: false,
            raw: String::new(),
            value: NaiveDateTime::MIN,
        }
    }
}

fn parse_with_millis(input: &str) -> Result<NaiveDateTime, ()> {
    // The format machinery needs a decimal point to see sub-seconds.
    let (secs, millis) = input.split_at(12);
    let dotted = format!("{secs}.{millis}");
    NaiveDateTime::parse_from_str(&dotted, "%y%m%d%H%M%S%.f").map_err(|_| ())
}

impl DateTimeSecCent {
    /// Parse a fifteen-digit `YYMMDDHHMMSSmmm` date-time.
    pub fn parse(input: &str) -> Result<DateTimeSecCent, TemporalError> {
        let err = || TemporalError::DateTime {
            shape: "YYMMDDHHMMSS.mmm",
            raw: input.to_string(),
        };
        if input.len() < 12 || !input.is_char_boundary(12) {
            return Err(err());
        }
        let value = parse_with_millis(input).map_err(|_| err())?;
        Ok(DateTimeSecCent {
            set: true,
            raw: input.to_string(),
            value,
        })
    }
}

/// A `YYMMDDHHMMSS` date-time with an optional three-digit millisecond
/// tail (twelve or fifteen digits on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeSecOptCent {
    /// Whether a value was decoded.
    pub set: bool,
    /// The wire text.
    pub raw: String,
    /// The parsed date-time.
    pub value: NaiveDateTime,
}

impl Default for DateTimeSecOptCent {
    fn default() -> Self {
        DateTimeSecOptCent {
            set: false,
            raw: String::new(),
            value: NaiveDateTime::MIN,
        }
    }
}

impl DateTimeSecOptCent {
    /// Parse either the twelve- or the fifteen-digit shape, selected by
    /// length.
    pub fn parse(input: &str) -> Result<DateTimeSecOptCent, TemporalError> {
        let value = if input.len() == 15 && input.is_char_boundary(12) {
            parse_with_millis(input).map_err(|_| TemporalError::DateTime {
                shape: "YYMMDDHHMMSS.mmm",
                raw: input.to_string(),
            })?
        } else {
            NaiveDateTime::parse_from_str(input, "%y%m%d%H%M%S").map_err(|_| {
                TemporalError::DateTime {
                    shape: "YYMMDDHHMMSS",
                    raw: input.to_string(),
                }
            })?
        };
        Ok(DateTimeSecOptCent {
            set: true,
            raw: input.to_string(),
            value,
        })
    }
}

/// A `YYMMDDHHMM±HHMM` date-time with a UTC offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeOffset {
    /// Whether a value was decoded.
    pub set: bool,
    /// The wire text.
    pub raw: String,
    /// The parsed local date-time.
    pub value: NaiveDateTime,
    /// The parsed offset from UTC, in minutes.
    pub offset_minutes: i32,
}

impl Default for DateTimeOffset {
    fn default() -> Self {
        DateTimeOffset {
            set: false,
            raw: String::new(),
            value: NaiveDateTime::MIN,
            offset_minutes: 0,
        }
    }
}

impl DateTimeOffset {
    /// Parse a `YYMMDDHHMM±HHMM` date-time.
    pub fn parse(input: &str) -> Result<DateTimeOffset, TemporalError> {
        let parsed = chrono::DateTime::parse_from_str(input, "%y%m%d%H%M%z").map_err(|_| {
            TemporalError::DateTime {
                shape: "YYMMDDHHMM±HHMM",
                raw: input.to_string(),
            }
        })?;
        Ok(DateTimeOffset {
            set: true,
            raw: input.to_string(),
            value: parsed.naive_local(),
            offset_minutes: parsed.offset().local_minus_utc() / 60,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn time_parses_hhmm() {
        let t = Time::parse("1157").expect("valid time");
        assert!(t.set);
        assert_eq!(t.raw, "1157");
        assert_eq!((t.value.hour(), t.value.minute()), (11, 57));
    }

    #[test]
    fn time_rejects_bad_digits_and_lengths() {
        assert!(Time::parse("1X57").is_err());
        assert!(Time::parse("115").is_err());
        assert!(Time::parse("11577").is_err());
        assert!(Time::parse("2460").is_err());
    }

    #[test]
    fn month_parses_mmdd() {
        let m = Month::parse("1020").expect("valid month/day");
        assert_eq!((m.value.month(), m.value.day()), (10, 20));
    }

    #[test]
    fn month_rejects_out_of_range() {
        assert!(Month::parse("1320").is_err());
        assert!(Month::parse("0230").is_err());
        assert!(Month::parse("102").is_err());
        assert!(Month::parse("C200").is_err());
    }

    #[test]
    fn date_parses_yymmdd() {
        let d = Date::parse("031002").expect("valid date");
        assert_eq!((d.value.year(), d.value.month(), d.value.day()), (2003, 10, 2));
    }

    #[test]
    fn two_digit_years_split_at_69() {
        assert_eq!(Date::parse("680101").expect("valid").value.year(), 2068);
        assert_eq!(Date::parse("690101").expect("valid").value.year(), 1969);
    }

    #[test]
    fn date_time_parses_and_rejects() {
        let dt = DateTime::parse("1806271539").expect("valid date-time");
        assert_eq!(dt.value.hour(), 15);
        assert!(DateTime::parse("18X6271539").is_err());
    }

    #[test]
    fn date_or_date_time_switches_on_length() {
        let date_only = DateOrDateTime::parse("091028").expect("date shape");
        assert_eq!(date_only.value.hour(), 0);
        let full = DateOrDateTime::parse("0910281157").expect("date-time shape");
        assert_eq!(full.value.hour(), 11);
        assert!(DateOrDateTime::parse("09102").is_err());
    }

    #[test]
    fn seconds_and_millis_shapes() {
        assert!(DateTimeSec::parse("060102150405").is_ok());
        let cent = DateTimeSecCent::parse("060102150405123").expect("millis shape");
        assert_eq!(cent.value.nanosecond() / 1_000_000, 123);
        let opt = DateTimeSecOptCent::parse("060102150405").expect("no-millis shape");
        assert!(opt.set);
        assert!(DateTimeSecOptCent::parse("123").is_err());
    }

    #[test]
    fn offset_shape_keeps_offset() {
        let dt = DateTimeOffset::parse("0601021504-0700").expect("offset shape");
        assert_eq!(dt.offset_minutes, -420);
        assert_eq!(dt.value.hour(), 15);
        assert!(DateTimeOffset::parse("0601021504").is_err());
    }
}
