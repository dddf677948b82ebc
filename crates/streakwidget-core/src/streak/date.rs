//! Normalization of stored activity timestamps to calendar dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::warn;

const LOCAL_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse a stored "last activity" value into a calendar date.
///
/// Accepted forms, tried in order:
/// - zone-qualified timestamps (`2024-03-10T21:15:00+02:00`, `...Z`, seconds
///   optional, with an optional `[Region/City]` suffix); the date is taken in
///   the timestamp's own offset
/// - local timestamps without a zone (`2024-03-10T21:15:00.000`)
/// - bare dates (`2024-03-10`)
///
/// Anything else is logged and treated as no prior activity.
pub fn parse_activity_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let zoned = strip_region_suffix(trimmed);
    if let Ok(dt) = DateTime::parse_from_rfc3339(zoned) {
        return Some(dt.date_naive());
    }
    let zoned = match zoned.strip_suffix('Z') {
        Some(utc) => format!("{utc}+00:00"),
        None => zoned.to_string(),
    };
    if let Ok(dt) = DateTime::parse_from_str(&zoned, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt.date_naive());
    }

    for format in LOCAL_DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    warn!(value = %raw, "unparseable last activity timestamp, treating as absent");
    None
}

fn strip_region_suffix(value: &str) -> &str {
    match value.find('[') {
        Some(idx) if value.ends_with(']') => &value[..idx],
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn parses_offset_timestamp_in_its_own_zone() {
        assert_eq!(
            parse_activity_date("2024-03-10T23:30:00+05:30"),
            date(2024, 3, 10)
        );
        assert_eq!(parse_activity_date("2024-03-10T00:15:00Z"), date(2024, 3, 10));
    }

    #[test]
    fn parses_region_qualified_timestamp() {
        assert_eq!(
            parse_activity_date("2024-03-10T08:00:00+01:00[Europe/Paris]"),
            date(2024, 3, 10)
        );
    }

    #[test]
    fn parses_zoned_timestamp_without_seconds() {
        assert_eq!(parse_activity_date("2024-03-10T21:15+02:00"), date(2024, 3, 10));
        assert_eq!(parse_activity_date("2024-03-10T23:45-08:00"), date(2024, 3, 10));
        assert_eq!(parse_activity_date("2024-03-10T00:05Z"), date(2024, 3, 10));
        assert_eq!(
            parse_activity_date("2024-03-10T21:15+01:00[Europe/Paris]"),
            date(2024, 3, 10)
        );
    }

    #[test]
    fn parses_local_timestamp_with_fraction() {
        assert_eq!(
            parse_activity_date("2024-03-10T21:15:42.123456"),
            date(2024, 3, 10)
        );
        assert_eq!(parse_activity_date("2024-03-10T21:15"), date(2024, 3, 10));
    }

    #[test]
    fn parses_bare_date_and_trims() {
        assert_eq!(parse_activity_date("  2024-03-10\n"), date(2024, 3, 10));
    }

    #[test]
    fn malformed_values_are_absent() {
        assert_eq!(parse_activity_date(""), None);
        assert_eq!(parse_activity_date("yesterday"), None);
        assert_eq!(parse_activity_date("2024-13-40"), None);
        assert_eq!(parse_activity_date("2024-03-10T25:00:00"), None);
    }
}
