//! Reminder delivery to the terminal.

use colored::Colorize;
use console::Term;
use notes_client::{Notification, Notifier};

/// Writes fired reminders to stderr so they show up over an open prompt.
pub struct TerminalNotifier {
    term: Term,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        let line = format!(
            "🔔 {} {}",
            notification.title.bright_yellow().bold(),
            notification.body
        );
        if let Err(e) = self.term.write_line(&line) {
            tracing::warn!(error = %e, "Failed to print reminder");
        }
    }
}
