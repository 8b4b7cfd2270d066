//! Meeting date parsing and display formats.
//!
//! Meeting dates are stored as the raw local datetime string typed into the
//! form (`yyyy-MM-ddTHH:mm`). Parsing is lenient: seconds and date-only
//! values are accepted, anything else is treated as "no date".

use chrono::{NaiveDate, NaiveDateTime};

const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";
const ACCEPTED_FORMATS: &[&str] = &[
    INPUT_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parses a stored meeting date.
pub fn parse_meeting_date(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    ACCEPTED_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Formats a datetime the way the date input stores it.
pub fn to_input_value(value: NaiveDateTime) -> String {
    value.format(INPUT_FORMAT).to_string()
}

/// `October 15, 2025 10:00 AM`, or `None` for unparseable input.
pub fn format_long(raw: &str) -> Option<String> {
    parse_meeting_date(raw).map(|value| value.format("%B %-d, %Y %-I:%M %p").to_string())
}

/// `Oct 15, 2025`, used by list rows.
pub fn format_list_date(raw: &str) -> Option<String> {
    parse_meeting_date(raw).map(|value| value.format("%b %-d, %Y").to_string())
}

/// `10:00 AM`, used by list rows.
pub fn format_list_time(raw: &str) -> Option<String> {
    parse_meeting_date(raw).map(|value| value.format("%-I:%M %p").to_string())
}

#[cfg(test)]
mod tests {
    use super::{format_list_date, format_list_time, format_long, parse_meeting_date};

    #[test]
    fn long_format_matches_export_header() {
        assert_eq!(
            format_long("2025-10-15T14:05").as_deref(),
            Some("October 15, 2025 2:05 PM")
        );
    }

    #[test]
    fn list_formats_split_date_and_time() {
        assert_eq!(format_list_date("2025-12-03T09:00").as_deref(), Some("Dec 3, 2025"));
        assert_eq!(format_list_time("2025-12-03T09:00").as_deref(), Some("9:00 AM"));
    }

    #[test]
    fn date_only_and_garbage_inputs() {
        assert!(parse_meeting_date("2025-01-02").is_some());
        assert!(parse_meeting_date("next tuesday").is_none());
        assert!(format_long("").is_none());
    }
}
