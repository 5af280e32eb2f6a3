//! Date parsing strategies.
//!
//! Two strategies coexist on purpose and must not be merged:
//! - [`extract_date`] feeds interval, frequency, uniqueness and time-window rules.
//!   Numeric cells are Excel serials counted from 1899-12-30.
//! - [`parse_simple_date`] feeds `dateFormat` only. Serials (numbers or digit-only
//!   strings) are counted from 1900-01-01, landing one day later than
//!   [`extract_date`] for the same serial.
//!
//! Both return `None` for anything unparseable; callers skip the row.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use visit_audit_core::FieldValue;

static CHINESE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})年(\d{1,2})月(\d{1,2})日").expect("valid regex"));

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"];

const MS_PER_DAY: f64 = 86_400_000.0;

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn excel_epoch(year: i32, month: u32, day: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day).map(midnight)
}

/// Add a fractional day count to an epoch, rounding to the millisecond.
fn add_days(epoch: NaiveDateTime, days: f64) -> Option<NaiveDateTime> {
    if !days.is_finite() {
        return None;
    }
    let ms = (days * MS_PER_DAY).round();
    if ms.abs() > i64::MAX as f64 {
        return None;
    }
    epoch.checked_add_signed(Duration::try_milliseconds(ms as i64)?)
}

/// Excel serial with the 1899-12-30 epoch (serial 1 = 1899-12-31).
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    add_days(excel_epoch(1899, 12, 30)?, serial)
}

/// Excel serial with the 1900-01-01 epoch (serial 1 = 1900-01-01).
fn excel_serial_from_1900(serial: f64) -> Option<NaiveDateTime> {
    add_days(excel_epoch(1900, 1, 1)?, serial - 1.0)
}

fn parse_chinese_date(s: &str) -> Option<NaiveDateTime> {
    let caps = CHINESE_DATE.captures(s)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).map(midnight)
}

/// Catch-all for the common textual shapes spreadsheets produce.
fn parse_generic(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(midnight(d));
        }
    }
    None
}

/// Resolve a cell to a date-time for interval, frequency, uniqueness and
/// time-window rules.
pub fn extract_date(value: &FieldValue) -> Option<NaiveDateTime> {
    match value {
        FieldValue::Date(dt) => Some(*dt),
        FieldValue::Number(n) => excel_serial_to_datetime(*n),
        FieldValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            parse_chinese_date(s).or_else(|| parse_generic(s))
        }
        FieldValue::Missing => None,
    }
}

/// Resolve a cell to a date-time for `dateFormat` rules.
pub fn parse_simple_date(value: &FieldValue) -> Option<NaiveDateTime> {
    match value {
        FieldValue::Date(dt) => Some(*dt),
        FieldValue::Number(n) => excel_serial_from_1900(*n),
        FieldValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if DIGITS.is_match(s) {
                return s.parse::<f64>().ok().and_then(excel_serial_from_1900);
            }
            if ISO_DATE.is_match(s) {
                return NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(midnight);
            }
            parse_chinese_date(s).or_else(|| parse_generic(s))
        }
        FieldValue::Missing => None,
    }
}
