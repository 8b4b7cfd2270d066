//! Terminal adapters for the core notification and confirmation ports.

use minutes_core::service::editor::Confirmer;
use minutes_core::{Notification, NotificationLevel, Notifier};
use std::io::{BufRead, Write};

/// Prints notifications to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notification: Notification) {
        let tag = match notification.level {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
        };
        eprintln!(
            "[{tag}] {}: {}",
            notification.title, notification.description
        );
    }
}

/// Asks on stderr and reads `y`/`yes` from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let _ = std::io::stderr().flush();

        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}
