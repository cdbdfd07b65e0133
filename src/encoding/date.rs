//! Display formatting for prescription timestamps.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

/// Returned for timestamps that cannot be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

const DISPLAY_FORMAT: &str = "%B %-d, %Y, %-I:%M %p";

/// Renders timestamps in a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayClock {
    offset: FixedOffset,
}

impl Default for DisplayClock {
    fn default() -> Self {
        DisplayClock { offset: Utc.fix() }
    }
}

impl DisplayClock {
    /// `None` when the offset is a day or more.
    pub fn with_offset_minutes(minutes: i32) -> Option<Self> {
        let seconds = minutes.checked_mul(60)?;
        FixedOffset::east_opt(seconds).map(|offset| DisplayClock { offset })
    }

    /// Long form such as "January 5, 2025, 3:45 PM", or [`INVALID_DATE`].
    pub fn format(&self, timestamp: &str) -> String {
        match self.parse(timestamp) {
            Some(instant) => instant
                .with_timezone(&self.offset)
                .format(DISPLAY_FORMAT)
                .to_string(),
            None => INVALID_DATE.to_string(),
        }
    }

    // Timestamps without an offset are read in the display offset; bare
    // dates are midnight UTC.
    fn parse(&self, timestamp: &str) -> Option<DateTime<FixedOffset>> {
        let timestamp = timestamp.trim();
        if let Ok(instant) = DateTime::parse_from_rfc3339(timestamp) {
            return Some(instant);
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, format) {
                return self.offset.from_local_datetime(&naive).single();
            }
        }
        NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
    }
}

/// Formats an ISO 8601 timestamp in UTC.
pub fn format_display_date(timestamp: &str) -> String {
    DisplayClock::default().format(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_formats_utc_timestamp() {
        let formatted = format_display_date("2025-01-05T15:45:00.000Z");
        assert_eq!(formatted, "January 5, 2025, 3:45 PM");
        assert!(formatted.contains("January 5, 2025"));
    }

    #[test]
    fn test_morning_and_midnight() {
        assert_eq!(
            format_display_date("2024-11-20T09:05:00Z"),
            "November 20, 2024, 9:05 AM"
        );
        assert_eq!(
            format_display_date("2024-11-20T00:00:00Z"),
            "November 20, 2024, 12:00 AM"
        );
    }

    #[test]
    fn test_explicit_offset_is_converted() {
        assert_eq!(
            format_display_date("2025-01-06T02:15:00+05:30"),
            "January 5, 2025, 8:45 PM"
        );
    }

    #[test]
    fn test_date_only_and_local_forms() {
        assert_eq!(format_display_date("2025-03-01"), "March 1, 2025, 12:00 AM");
        assert_eq!(format_display_date("2025-03-01T13:30"), "March 1, 2025, 1:30 PM");
    }

    #[test]
    fn test_configured_offset() {
        let clock = DisplayClock::with_offset_minutes(330).unwrap();
        assert_eq!(clock.format("2025-01-05T15:45:00.000Z"), "January 5, 2025, 9:15 PM");

        let west = DisplayClock::with_offset_minutes(-300).unwrap();
        assert_eq!(west.format("2025-01-05T03:00:00Z"), "January 4, 2025, 10:00 PM");
        // No offset in the input: read as display-local time
        assert_eq!(west.format("2025-01-05T03:00:00"), "January 5, 2025, 3:00 AM");
    }

    #[test]
    fn test_offset_bounds() {
        assert!(DisplayClock::with_offset_minutes(23 * 60 + 59).is_some());
        assert!(DisplayClock::with_offset_minutes(24 * 60).is_none());
        assert!(DisplayClock::with_offset_minutes(i32::MAX).is_none());
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(format_display_date(""), INVALID_DATE);
        assert_eq!(format_display_date("yesterday"), INVALID_DATE);
        assert_eq!(format_display_date("2025-13-01T00:00:00Z"), INVALID_DATE);
    }
}
