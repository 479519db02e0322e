//! Date helpers behind the `date` template filter

use chrono::{DateTime, TimeZone, Utc};

use crate::content::parse_date_string;

/// The one format the `date` filter names explicitly
pub const ISO_DATE_FORMAT: &str = "YYYY-MM-DD";

/// Format a date for templates.
///
/// `YYYY-MM-DD` yields the UTC calendar date; any other format falls back
/// to the same ISO date.
pub fn format_date(date: &DateTime<Utc>, format: Option<&str>) -> String {
    if let Some(format) = format.filter(|f| *f != ISO_DATE_FORMAT) {
        tracing::trace!("Unsupported date format {:?}, using ISO date", format);
    }
    date.format("%Y-%m-%d").to_string()
}

/// `date` filter over a textual date; unparseable input yields `""`
///
/// # Examples
/// ```ignore
/// date_filter("2024-01-05T00:00:00Z", Some("YYYY-MM-DD")) // -> "2024-01-05"
/// date_filter("not-a-date", None) // -> ""
/// ```
pub fn date_filter(input: &str, format: Option<&str>) -> String {
    parse_date_string(input)
        .map(|date| format_date(&date, format))
        .unwrap_or_default()
}

/// `date` filter over epoch milliseconds
pub fn date_filter_millis(millis: i64, format: Option<&str>) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|date| format_date(&date, format))
        .unwrap_or_default()
}

/// Format a date in RFC 3339, for `<time datetime>` attributes
pub fn date_xml(date: &DateTime<Utc>) -> String {
    date.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_input() {
        assert_eq!(
            date_filter("2024-01-05T00:00:00Z", Some("YYYY-MM-DD")),
            "2024-01-05"
        );
    }

    #[test]
    fn test_invalid_input_is_empty() {
        assert_eq!(date_filter("not-a-date", Some("YYYY-MM-DD")), "");
        assert_eq!(date_filter("", None), "");
    }

    #[test]
    fn test_other_formats_fall_back_to_iso_date() {
        assert_eq!(date_filter("2024-03-09 18:45:00", Some("MMMM D, YYYY")), "2024-03-09");
        assert_eq!(date_filter("2024/03/09", None), "2024-03-09");
    }

    #[test]
    fn test_offset_is_normalized_to_utc() {
        assert_eq!(date_filter("2024-01-05T01:00:00+02:00", None), "2024-01-04");
    }

    #[test]
    fn test_millis() {
        assert_eq!(date_filter_millis(0, None), "1970-01-01");
        assert_eq!(date_filter_millis(1_704_412_800_000, None), "2024-01-05");
        assert_eq!(date_filter_millis(i64::MAX, None), "");
    }
}
