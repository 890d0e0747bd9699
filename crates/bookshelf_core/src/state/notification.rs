//! Notification screen state.

use crate::model::notification::{DisplayNotification, NotificationEvent, NotificationGroup};
use crate::notify::aggregate::{format_events, group_notifications};
use crate::snapshot::parse_notifications;
use chrono::{DateTime, Utc};
use log::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationAction {
    LoadStarted,
    LoadSucceeded {
        formatted: Vec<DisplayNotification>,
        grouped: Vec<NotificationGroup>,
    },
    LoadFailed(String),
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationState {
    pub notifications: Vec<DisplayNotification>,
    pub grouped_notifications: Vec<NotificationGroup>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl NotificationState {
    pub fn reduce(mut self, action: NotificationAction) -> Self {
        match action {
            NotificationAction::LoadStarted => {
                self.is_loading = true;
                self.error = None;
            }
            NotificationAction::LoadSucceeded { formatted, grouped } => {
                self.is_loading = false;
                self.notifications = formatted;
                self.grouped_notifications = grouped;
            }
            NotificationAction::LoadFailed(message) => {
                self.is_loading = false;
                self.error = Some(message);
            }
            NotificationAction::Clear => {
                self.notifications.clear();
                self.grouped_notifications.clear();
            }
        }
        self
    }

    /// Formats and groups `events`, then stores both projections.
    pub fn load(self, events: &[NotificationEvent], now: DateTime<Utc>) -> Self {
        let state = self.reduce(NotificationAction::LoadStarted);
        let formatted = format_events(events, now);
        let grouped = group_notifications(formatted.clone());
        info!(
            "event=notifications_load module=state status=ok items={} groups={}",
            formatted.len(),
            grouped.len()
        );
        state.reduce(NotificationAction::LoadSucceeded { formatted, grouped })
    }

    /// Like [`Self::load`], decoding the events from JSON first.
    ///
    /// A payload that is not an array of `{text, time}` objects ends in
    /// `LoadFailed` with the previous lists kept.
    pub fn load_json(self, json: &str, now: DateTime<Utc>) -> Self {
        match parse_notifications(json) {
            Ok(events) => self.load(&events, now),
            Err(err) => {
                warn!(
                    "event=notifications_load module=state status=error error={}",
                    err
                );
                self.reduce(NotificationAction::LoadStarted)
                    .reduce(NotificationAction::LoadFailed(err.to_string()))
            }
        }
    }
}
