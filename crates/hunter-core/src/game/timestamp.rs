use chrono::{DateTime, NaiveDateTime, Utc};

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Remove the `<...>` wrapper and quotes the log puts around timestamps
pub fn clean_timestamp(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches(['<', '\''])
        .trim_end_matches(['>', '\''])
}

/// Parse a log or Servitor timestamp as UTC
///
/// Accepts RFC 3339 (`2025-04-14T16:42:53.465Z`) and zone-less variants,
/// which are interpreted as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let cleaned = clean_timestamp(raw);
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(cleaned, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Timestamp token at the start of a log line
pub fn line_timestamp(line: &str) -> Option<&str> {
    let first = line.split_whitespace().next()?;
    if first.starts_with('<') && first.ends_with('>') {
        Some(clean_timestamp(first))
    } else {
        None
    }
}
