//! Header grammar (`Name: value` until the first blank line, RFC-822 folding)
//! and permissive date parsing.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use tracing::warn;

use crate::model::message::Headers;

/// Split message text into parsed headers and the remaining body.
///
/// Header lines run from the start of the text to the first blank line.
/// Continuation lines (leading space or tab) are unfolded into the preceding
/// header's value. A non-continuation line without a colon means the
/// header/body separator is missing: the body starts at that line, nothing
/// is discarded. Duplicate header names overwrite the earlier value,
/// keeping its position.
pub fn split_headers_body(text: &str) -> (Headers, String) {
    let mut headers = Headers::default();
    let mut last_name: Option<String> = None;
    let mut pos = 0;

    while pos < text.len() {
        let line_end = text[pos..]
            .find('\n')
            .map_or(text.len(), |i| pos + i + 1);
        let line = text[pos..line_end].trim_end_matches('\n');

        if line.trim().is_empty() {
            // First blank line: everything after it is the body.
            pos = line_end;
            break;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            // Folded continuation of the previous header. A continuation
            // with no preceding header is a tolerated defect.
            if let Some(name) = &last_name {
                if let Some(value) = headers.get(name) {
                    let unfolded = format!("{} {}", value, line.trim());
                    headers.insert(name.clone(), unfolded);
                }
            }
        } else if let Some(colon) = line.find(':') {
            let name = line[..colon].trim().to_string();
            let value = line[colon + 1..].trim().to_string();
            last_name = Some(name.clone());
            headers.insert(name, value);
        } else {
            // Missing separator: the body starts here.
            return (headers, text[pos..].to_string());
        }

        pos = line_end;
    }

    (headers, text[pos..].to_string())
}

/// Parse an email date string in the formats common to old list archives.
///
/// Supports RFC 2822 (including two-digit years), ISO 8601, and several
/// broken real-world variants. The original offset is preserved where the
/// input carries one; naive timestamps are taken as UTC.
pub fn parse_date(date_str: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Try chrono's RFC 2822
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt);
    }

    // Try ISO 8601 / RFC 3339
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt);
    }

    // Remove leading day-of-week: "Thu, " or "Thu "
    let no_dow = strip_day_of_week(trimmed);

    let formats = [
        "%d %b %Y %H:%M:%S %z",
        "%d %b %Y %H:%M:%S",
        "%d %b %y %H:%M:%S %z",
        "%d %b %y %H:%M:%S",
        "%d %b %Y %H:%M %z",
        "%d %b %Y %H:%M",
        "%b %d %H:%M:%S %Y",
        "%Y-%m-%dT%H:%M:%S%z",
        "%Y-%m-%d %H:%M:%S %z",
        "%Y-%m-%d %H:%M:%S",
    ];

    for fmt in &formats {
        if let Ok(dt) = DateTime::parse_from_str(&no_dow, fmt) {
            return Some(dt);
        }
        if let Ok(ndt) = NaiveDateTime::parse_from_str(&no_dow, fmt) {
            return Some(Utc.from_utc_datetime(&ndt).fixed_offset());
        }
    }

    // Replace named timezones with offsets and try again
    let replaced = replace_named_tz(&no_dow);
    for fmt in &formats {
        if let Ok(dt) = DateTime::parse_from_str(&replaced, fmt) {
            return Some(dt);
        }
    }

    // Try using mail-parser's date parsing as last resort
    if let Some(dt) = mail_parser_date(trimmed) {
        return Some(dt);
    }

    warn!(date = trimmed, "Could not parse date");
    None
}

/// Attempt to parse a date using `mail-parser`'s built-in parser.
fn mail_parser_date(input: &str) -> Option<DateTime<FixedOffset>> {
    use mail_parser::MessageParser;

    // Wrap input in a minimal RFC 5322 message so mail-parser can parse it
    let fake_msg = format!("Date: {input}\n\n");
    let parser = MessageParser::default();
    let parsed = parser.parse(fake_msg.as_bytes())?;
    let dt = parsed.date()?.to_rfc3339();
    DateTime::parse_from_rfc3339(&dt).ok()
}

/// Strip leading day-of-week prefix (e.g. "Thu, " or "Thu ").
fn strip_day_of_week(s: &str) -> String {
    let days = [
        "Mon,", "Tue,", "Wed,", "Thu,", "Fri,", "Sat,", "Sun,", "Mon ", "Tue ", "Wed ", "Thu ",
        "Fri ", "Sat ", "Sun ",
    ];
    for day in &days {
        if let Some(rest) = s.strip_prefix(day) {
            return rest.trim().to_string();
        }
    }
    s.to_string()
}

/// Replace well-known timezone abbreviations with numeric offsets.
fn replace_named_tz(s: &str) -> String {
    let tzs = [
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
        ("UT", "+0000"),
        ("BST", "+0100"),
        ("CET", "+0100"),
        ("CEST", "+0200"),
    ];
    let mut result = s.to_string();
    for (name, offset) in &tzs {
        if result.ends_with(name) {
            let pos = result.len() - name.len();
            result.replace_range(pos.., offset);
            return result;
        }
    }
    result
}
