//! Date helper functions

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse a front-matter date in one of the common formats
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // RFC 3339 / ISO 8601 with offset
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local())
}

/// Format a date string using a Moment.js-compatible format string.
/// Returns `None` when the date cannot be parsed.
///
/// # Examples
/// ```ignore
/// format_date("2024-01-15", "MMMM D, YYYY") // -> Some("January 15, 2024")
/// ```
pub fn format_date(date: &str, format: &str) -> Option<String> {
    let dt = parse_date(date)?;
    Some(dt.format(&moment_to_chrono_format(format)).to_string())
}

/// Convert Moment.js format tokens to chrono specifiers.
///
/// Text inside `[...]` is literal, unknown letters pass through and `%` is
/// escaped, so the result is always a valid chrono format.
fn moment_to_chrono_format(format: &str) -> String {
    // Longest tokens first
    const TOKENS: &[(&str, &str)] = &[
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("M", "%-m"),
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("D", "%-d"),
        ("dddd", "%A"),
        ("ddd", "%a"),
        ("HH", "%H"),
        ("H", "%-H"),
        ("hh", "%I"),
        ("h", "%-I"),
        ("mm", "%M"),
        ("ss", "%S"),
        ("SSS", "%3f"),
        ("ZZ", "%z"),
        ("Z", "%:z"),
        ("A", "%p"),
        ("a", "%P"),
    ];

    let mut out = String::with_capacity(format.len() * 2);
    let mut rest = format;
    'outer: while let Some(c) = rest.chars().next() {
        if c == '[' {
            if let Some(end) = rest.find(']') {
                out.push_str(&rest[1..end].replace('%', "%%"));
                rest = &rest[end + 1..];
                continue;
            }
        }
        for (token, spec) in TOKENS {
            if let Some(after) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = after;
                continue 'outer;
            }
        }
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(
            format_date("2024-01-15 10:30:00", "YYYY-MM-DD").as_deref(),
            Some("2024-01-15")
        );
        assert_eq!(
            format_date("2024/01/05", "MMMM D, YYYY").as_deref(),
            Some("January 5, 2024")
        );
        assert_eq!(format_date("yesterday", "YYYY"), None);
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_chrono_format("HH:mm:ss"), "%H:%M:%S");
        assert_eq!(moment_to_chrono_format("[Day] D 100%"), "Day %-d 100%%");
    }

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_date("2024-01-15T10:30:00+02:00").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "10:30");
    }
}
