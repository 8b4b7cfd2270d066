//! User-facing notifications ("toasts").
//!
//! Core reports outcomes through the `Notifier` port; the UI layer decides
//! how to show them. `LogNotifier` is the headless default.

use log::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Info, title, description)
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Success, title, description)
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Error, title, description)
    }

    fn with_level(
        level: NotificationLevel,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            level,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Sink for user-visible notifications.
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Writes notifications to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        // Only the title is logged; descriptions may carry meeting content.
        match notification.level {
            NotificationLevel::Error => error!(
                "event=notify module=notify status=error title={}",
                notification.title
            ),
            _ => info!(
                "event=notify module=notify status=ok title={}",
                notification.title
            ),
        }
    }
}
