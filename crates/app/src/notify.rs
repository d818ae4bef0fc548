//! Transient user notifications.

use std::io::{self, Write};

use mockall::automock;
use tracing::{info, warn};

/// Sink for short success and failure messages shown to the user.
#[automock]
pub trait Notifier: Send + Sync {
    /// An action succeeded.
    fn success(&self, message: &str);

    /// An action failed.
    fn error(&self, message: &str);
}

/// Emits notifications as log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(target: "vitrine::notice", "{message}");
    }

    fn error(&self, message: &str) {
        warn!(target: "vitrine::notice", "{message}");
    }
}

/// Writes notifications to standard error for interactive use.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    fn write(marker: &str, message: &str) {
        if let Err(error) = writeln!(io::stderr().lock(), "{marker} {message}") {
            warn!(%error, message, "failed to write notification");
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        Self::write("✓", message);
    }

    fn error(&self, message: &str) {
        Self::write("✗", message);
    }
}
