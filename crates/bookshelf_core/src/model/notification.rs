//! Notification records before and after display formatting.

use serde::{Deserialize, Serialize};

/// Raw timestamped event as stored in the notification asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub text: String,
    /// ISO-8601 timestamp text; parsed lazily so one bad row cannot fail a batch.
    pub time: String,
}

impl NotificationEvent {
    pub fn new(text: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            time: time.into(),
        }
    }
}

/// Event after timezone normalization and bucketing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayNotification {
    pub text: String,
    /// Group label: "Hôm nay", `day/month`, or "Không xác định".
    pub title: String,
    /// `HH:MM` in the display zone, or `--:--` when the timestamp was invalid.
    pub time: String,
}

/// Ordered bucket of notifications sharing one title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationGroup {
    pub title: String,
    pub items: Vec<DisplayNotification>,
}
