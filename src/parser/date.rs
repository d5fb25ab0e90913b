//! `Date:` header parsing and the sortable timestamp used in new filenames.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::{debug, warn};

use crate::normalize::{strip_all, Rules};

/// The date part of a new filename plus the instant it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    /// Formatted UTC time, or the no-date sentinel.
    pub text: String,
    /// Parsed instant; `None` when the header was missing or unparseable.
    pub instant: Option<DateTime<Utc>>,
}

impl Timestamp {
    /// Whether a real date was found.
    pub fn is_known(&self) -> bool {
        self.instant.is_some()
    }
}

/// Convert a `Date:` header into a [`Timestamp`] formatted in UTC.
pub fn canonical_timestamp(date_header: Option<&str>, rules: &Rules) -> Timestamp {
    let Some(instant) = date_header.and_then(parse_date) else {
        return Timestamp {
            text: rules.no_date.clone(),
            instant: None,
        };
    };

    let mut text = String::new();
    if write!(text, "{}", instant.format(&rules.date_format)).is_err() {
        warn!(format = %rules.date_format, "Invalid date format, using sentinel");
        return Timestamp {
            text: rules.no_date.clone(),
            instant: Some(instant),
        };
    }

    let text = strip_all(&text, rules.illegal.iter().map(String::as_str));
    if text.is_empty() {
        return Timestamp {
            text: rules.no_date.clone(),
            instant: Some(instant),
        };
    }

    Timestamp {
        text,
        instant: Some(instant),
    }
}

/// Parse an email date string in various common formats.
///
/// Supports RFC 2822, ISO 8601, and common broken real-world variants.
/// Dates without a zone are taken as UTC.
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    // Drop trailing comments such as "(EDT)" and the day of week.
    let no_comment = trimmed.split(" (").next().unwrap_or(trimmed).trim();
    let no_dow = strip_day_of_week(no_comment);
    let candidates = [no_dow.clone(), replace_named_tz(&no_dow)];

    let formats = [
        "%d %b %Y %H:%M:%S %z",
        "%d %b %Y %H:%M %z",
        "%d %b %Y %H:%M:%S",
        "%b %d %H:%M:%S %Y",
        "%Y-%m-%d %H:%M:%S %z",
        "%Y-%m-%d %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
    ];

    for candidate in &candidates {
        for fmt in &formats {
            if let Ok(dt) = DateTime::parse_from_str(candidate, fmt) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(ndt) = NaiveDateTime::parse_from_str(candidate, fmt) {
                return Some(Utc.from_utc_datetime(&ndt));
            }
        }
    }

    if let Some(dt) = mail_parser_date(trimmed) {
        return Some(dt);
    }

    debug!(date = trimmed, "Could not parse date");
    None
}

/// Attempt to parse a date using `mail-parser`'s built-in parser.
fn mail_parser_date(input: &str) -> Option<DateTime<Utc>> {
    use mail_parser::MessageParser;

    // Wrap input in a minimal RFC 5322 message so mail-parser can parse it
    let fake_msg = format!("Date: {input}\n\n");
    let parsed = MessageParser::default().parse(fake_msg.as_bytes())?;
    let dt = parsed.date()?.to_rfc3339();
    DateTime::parse_from_rfc3339(&dt)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Strip leading day-of-week prefix (e.g. "Thu, " or "Thu ").
fn strip_day_of_week(s: &str) -> String {
    const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    for day in DAYS {
        if let Some(rest) = s.strip_prefix(day) {
            if let Some(rest) = rest.strip_prefix(',').or_else(|| rest.strip_prefix(' ')) {
                return rest.trim().to_string();
            }
        }
    }
    s.to_string()
}

/// Replace well-known timezone abbreviations with numeric offsets.
fn replace_named_tz(s: &str) -> String {
    // Longer names first: "CEST" also ends with "EST".
    const ZONES: [(&str, &str); 13] = [
        ("CEST", "+0200"),
        ("EST", "-0500"),
        ("EDT", "-0400"),
        ("CST", "-0600"),
        ("CDT", "-0500"),
        ("MST", "-0700"),
        ("MDT", "-0600"),
        ("PST", "-0800"),
        ("PDT", "-0700"),
        ("GMT", "+0000"),
        ("UTC", "+0000"),
        ("CET", "+0100"),
        ("JST", "+0900"),
    ];
    for (name, offset) in ZONES {
        if let Some(head) = s.strip_suffix(name) {
            return format!("{head}{offset}");
        }
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_timestamp_converts_to_utc() {
        let ts = canonical_timestamp(Some("Tue, 15 Aug 2017 10:30:00 -0400"), &Rules::default());
        assert_eq!(ts.text, "2017_08_15_143000");
        assert_eq!(ts.instant.unwrap().timestamp(), 1_502_807_400);
    }

    #[test]
    fn test_canonical_timestamp_missing_or_bad() {
        let rules = Rules::default();
        let missing = canonical_timestamp(None, &rules);
        assert_eq!(missing.text, "0000_00_00");
        assert!(!missing.is_known());

        let bad = canonical_timestamp(Some("sometime last week"), &rules);
        assert_eq!(bad.text, "0000_00_00");
        assert!(bad.instant.is_none());
    }

    #[test]
    fn test_canonical_timestamp_custom_format() {
        let rules = Rules {
            date_format: "%Y%m%d".to_string(),
            ..Rules::default()
        };
        let ts = canonical_timestamp(Some("Mon, 01 Jan 2024 23:30:00 -0100"), &rules);
        assert_eq!(ts.text, "20240102");
    }

    #[test]
    fn test_canonical_timestamp_strips_illegal_characters() {
        let rules = Rules {
            date_format: "%Y-%m-%d %H:%M".to_string(),
            ..Rules::default()
        };
        let ts = canonical_timestamp(Some("Tue, 15 Aug 2017 10:30:00 -0400"), &rules);
        assert_eq!(ts.text, "2017-08-15 1430");
        assert!(ts.is_known());

        let only_illegal = Rules {
            date_format: "::".to_string(),
            ..Rules::default()
        };
        let ts = canonical_timestamp(Some("Tue, 15 Aug 2017 10:30:00 -0400"), &only_illegal);
        assert_eq!(ts.text, "0000_00_00");
    }

    #[test]
    fn test_parse_date_rfc2822() {
        let dt = parse_date("Thu, 04 Jan 2024 10:00:00 +0000").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-01-04 10:00");
    }

    #[test]
    fn test_parse_date_with_comment() {
        let dt = parse_date("Tue, 15 Aug 2017 10:30:00 -0400 (EDT)").unwrap();
        assert_eq!(dt.format("%H%M").to_string(), "1430");
    }

    #[test]
    fn test_parse_date_without_dow() {
        assert!(parse_date("04 Jan 2024 10:00:00 +0000").is_some());
    }

    #[test]
    fn test_parse_date_named_tz() {
        let dt = parse_date("Thu, 04 Jan 2024 10:00:00 EST").unwrap();
        assert_eq!(dt.format("%H").to_string(), "15");
    }

    #[test]
    fn test_parse_date_iso8601() {
        assert!(parse_date("2024-01-04T10:00:00Z").is_some());
    }

    #[test]
    fn test_parse_date_empty() {
        assert!(parse_date("   ").is_none());
    }

    #[test]
    fn test_replace_named_tz_prefers_longest() {
        assert_eq!(replace_named_tz("04 Jan 2024 10:00:00 CEST"), "04 Jan 2024 10:00:00 +0200");
        assert_eq!(replace_named_tz("04 Jan 2024 10:00:00 CET"), "04 Jan 2024 10:00:00 +0100");
    }
}
