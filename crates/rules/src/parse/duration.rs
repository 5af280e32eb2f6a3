//! Visit duration parsing into minutes.
//!
//! Accepted shapes: bare numbers (minutes), minute suffixes (`分钟`, `分`,
//! `min`, `mins`, `minutes`, `m`), hour suffixes (`小时`, `时`, `h`, `hr`,
//! `hours`) and one composite form (`1h30m`, `1小时30分钟`).

use std::sync::LazyLock;

use regex::Regex;
use visit_audit_core::FieldValue;

const NUMBER: &str = r"(\d+(?:\.\d+)?)";

static BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^{NUMBER}$")).expect("valid regex"));

static MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^{NUMBER}\s*(?:分钟|分|minutes|minute|mins|min|m)$"
    ))
    .expect("valid regex")
});

static HOURS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^{NUMBER}\s*(?:小时|时|hours|hour|hrs|hr|h)$"
    ))
    .expect("valid regex")
});

static COMPOSITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^{NUMBER}\s*(?:小时|h)\s*{NUMBER}\s*(?:分钟|分|min|m)$"
    ))
    .expect("valid regex")
});

/// Parse a duration cell into minutes. `None` when the shape is not recognised.
pub fn parse_duration(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Number(n) if n.is_finite() => Some(*n),
        FieldValue::Text(s) => parse_duration_str(s),
        _ => None,
    }
}

fn parse_duration_str(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(caps) = BARE.captures(s) {
        return caps[1].parse().ok();
    }
    if let Some(caps) = MINUTES.captures(s) {
        return caps[1].parse().ok();
    }
    if let Some(caps) = HOURS.captures(s) {
        return caps[1].parse::<f64>().ok().map(|h| h * 60.0);
    }
    if let Some(caps) = COMPOSITE.captures(s) {
        let hours: f64 = caps[1].parse().ok()?;
        let minutes: f64 = caps[2].parse().ok()?;
        return Some(hours * 60.0 + minutes);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minutes(s: &str) -> Option<f64> {
        parse_duration(&FieldValue::from(s))
    }

    #[test]
    fn bare_number_is_minutes() {
        assert_eq!(minutes("90"), Some(90.0));
        assert_eq!(minutes(" 45.5 "), Some(45.5));
        assert_eq!(parse_duration(&FieldValue::Number(30.0)), Some(30.0));
    }

    #[test]
    fn minute_suffixes() {
        assert_eq!(minutes("90min"), Some(90.0));
        assert_eq!(minutes("90 分钟"), Some(90.0));
        assert_eq!(minutes("20分"), Some(20.0));
        assert_eq!(minutes("15 Minutes"), Some(15.0));
    }

    #[test]
    fn hour_suffixes() {
        assert_eq!(minutes("1.5小时"), Some(90.0));
        assert_eq!(minutes("2h"), Some(120.0));
        assert_eq!(minutes("1 hour"), Some(60.0));
    }

    #[test]
    fn composite_forms() {
        assert_eq!(minutes("1小时30分钟"), Some(90.0));
        assert_eq!(minutes("1h30m"), Some(90.0));
        assert_eq!(minutes("2h 5min"), Some(125.0));
    }

    #[test]
    fn unparseable_is_none() {
        assert_eq!(minutes("abc"), None);
        assert_eq!(minutes(""), None);
        assert_eq!(minutes("ninety minutes"), None);
        assert_eq!(parse_duration(&FieldValue::Missing), None);
    }
}
