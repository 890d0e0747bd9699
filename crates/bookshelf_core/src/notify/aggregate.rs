//! Notification formatting and grouping.
//!
//! # Responsibility
//! - Parse event timestamps and render `HH:MM` in UTC+7.
//! - Label each event "Hôm nay" or `day/month` relative to `now`.
//! - Group labelled events in first-seen order.
//!
//! # Invariants
//! - Group order is the first-seen order of titles in one left-to-right pass.
//! - Item order inside a group is encounter order.
//! - The "today" check compares day and month only; the year is ignored.

use crate::model::notification::{DisplayNotification, NotificationEvent, NotificationGroup};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};
use log::warn;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Display zone offset east of UTC, in seconds.
pub const DISPLAY_OFFSET_SECS: i32 = 7 * 60 * 60;
/// Title for events on the same day and month as `now`.
pub const TITLE_TODAY: &str = "Hôm nay";
/// Title for events whose timestamp cannot be parsed.
pub const TITLE_UNKNOWN: &str = "Không xác định";
/// Display time for events whose timestamp cannot be parsed.
pub const TIME_UNKNOWN: &str = "--:--";

static DISPLAY_OFFSET: Lazy<FixedOffset> = Lazy::new(|| {
    FixedOffset::east_opt(DISPLAY_OFFSET_SECS).expect("UTC+7 is a valid fixed offset")
});

const OFFSET_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
];

const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Timestamp parse failure for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    Empty,
    Unrecognized(String),
}

impl Display for TimestampError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "timestamp is empty"),
            Self::Unrecognized(raw) => write!(f, "unrecognized timestamp `{raw}`"),
        }
    }
}

impl Error for TimestampError {}

/// Returns the fixed display zone.
pub fn display_offset() -> FixedOffset {
    *DISPLAY_OFFSET
}

/// Parses an event timestamp into a UTC instant.
///
/// Accepted shapes:
/// - RFC 3339 with `Z` or a numeric offset.
/// - ISO-8601 variants RFC 3339 leaves out: minute precision, or an offset
///   without a colon (`+0700`, `+07`).
/// - Date-time without offset, read as UTC.
/// - Bare `YYYY-MM-DD`, read as midnight UTC.
///
/// # Errors
/// - `Empty` for blank input.
/// - `Unrecognized` for anything else.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TimestampError::Empty);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in OFFSET_DATE_TIME_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(trimmed, format) {
            return Ok(parsed.with_timezone(&Utc));
        }
    }

    let (naive, zulu) = match trimmed.strip_suffix(['Z', 'z']) {
        Some(rest) => (rest, true),
        None => (trimmed, false),
    };
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(parsed.and_utc());
        }
    }
    if zulu {
        return Err(TimestampError::Unrecognized(trimmed.to_string()));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| TimestampError::Unrecognized(trimmed.to_string()))
}

/// Formats every event for display, relative to `now`.
///
/// Invalid timestamps become [`TITLE_UNKNOWN`] / [`TIME_UNKNOWN`] entries and
/// are logged as warnings.
pub fn format_events(events: &[NotificationEvent], now: DateTime<Utc>) -> Vec<DisplayNotification> {
    let today = now.with_timezone(&display_offset());
    events
        .iter()
        .map(|event| format_event(event, today.day(), today.month()))
        .collect()
}

/// Groups formatted notifications by exact title.
pub fn group_notifications(items: Vec<DisplayNotification>) -> Vec<NotificationGroup> {
    let mut groups: Vec<NotificationGroup> = Vec::new();
    let mut index_by_title = HashMap::<String, usize>::new();

    for item in items {
        match index_by_title.get(&item.title) {
            Some(&index) => groups[index].items.push(item),
            None => {
                index_by_title.insert(item.title.clone(), groups.len());
                groups.push(NotificationGroup {
                    title: item.title.clone(),
                    items: vec![item],
                });
            }
        }
    }

    groups
}

/// Formats and groups events in one call.
pub fn aggregate(events: &[NotificationEvent], now: DateTime<Utc>) -> Vec<NotificationGroup> {
    group_notifications(format_events(events, now))
}

fn format_event(event: &NotificationEvent, today_day: u32, today_month: u32) -> DisplayNotification {
    let instant = match parse_timestamp(&event.time) {
        Ok(instant) => instant,
        Err(err) => {
            let reason = match err {
                TimestampError::Empty => "empty_timestamp",
                TimestampError::Unrecognized(_) => "invalid_timestamp",
            };
            warn!(
                "event=notification_format module=notify status=degraded reason={} input_len={}",
                reason,
                event.time.chars().count()
            );
            return DisplayNotification {
                text: event.text.clone(),
                title: TITLE_UNKNOWN.to_string(),
                time: TIME_UNKNOWN.to_string(),
            };
        }
    };

    let local = instant.with_timezone(&display_offset());
    let title = if local.day() == today_day && local.month() == today_month {
        TITLE_TODAY.to_string()
    } else {
        format!("{}/{}", local.day(), local.month())
    };

    DisplayNotification {
        text: event.text.clone(),
        title,
        time: format!("{:02}:{:02}", local.hour(), local.minute()),
    }
}

#[cfg(test)]
mod tests {
    use super::{display_offset, parse_timestamp, TimestampError};
    use chrono::{TimeZone, Utc};

    #[test]
    fn parse_accepts_rfc3339_naive_and_date_only() {
        let expected = Utc.with_ymd_and_hms(2024, 10, 22, 1, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-10-22T01:30:00Z").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-10-22T08:30:00+07:00").unwrap(),
            expected
        );
        assert_eq!(parse_timestamp(" 2024-10-22T01:30:00.000 ").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-10-22 01:30").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-10-22T01:30Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-10-22T08:30:00+0700").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-10-22T08:30+07:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-10-22T08:30:00.000+07").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-10-22").unwrap(),
            Utc.with_ymd_and_hms(2024, 10, 22, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn parse_rejects_blank_and_garbage() {
        assert_eq!(parse_timestamp("   ").unwrap_err(), TimestampError::Empty);
        assert!(matches!(
            parse_timestamp("not-a-date").unwrap_err(),
            TimestampError::Unrecognized(_)
        ));
        assert!(parse_timestamp("2024-13-40").is_err());
    }

    #[test]
    fn display_offset_is_seven_hours_east() {
        assert_eq!(display_offset().local_minus_utc(), 7 * 3600);
    }
}
