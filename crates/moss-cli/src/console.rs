//! Console notifier with the English message bundle.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use moss_formats::notify::{
    Notifier, IDS_NOTIFY_CANCELLED, IDS_NOTIFY_COLLECTING, IDS_NOTIFY_DETECTING, IDS_NOTIFY_ERROR,
    IDS_NOTIFY_NOTHING_DETECTED, IDS_NOTIFY_OK, IDS_NOTIFY_RENAMED,
    IDS_NOTIFY_RENAME_NOT_DEFINED, IDS_NOTIFY_SKIPPED, IDS_NOTIFY_STORING,
    IDS_NOTIFY_STORING_LIBRARY,
};

/// Notifier writing info to stdout and errors to stderr.
///
/// Completion is published through an atomic flag which the driver
/// thread polls, so the pipeline may run on a worker thread.
#[derive(Debug, Default)]
pub(crate) struct ConsoleNotifier {
    finished: AtomicBool,
    cancelled: AtomicBool,
}

impl ConsoleNotifier {
    /// Creates a notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// True once `finished` was signaled.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// True if the run finished cancelled.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Notifier for ConsoleNotifier {
    fn log(&self, message_id: &str, params: &[&str]) {
        println!("{}", render(message_id, params));
    }

    fn log_error(&self, message_id: &str, params: &[&str]) {
        eprintln!("{}: {}", "error".red(), render(message_id, params));
    }

    fn finished(&self, cancelled: bool) {
        self.cancelled.store(cancelled, Ordering::Release);
        self.finished.store(true, Ordering::Release);
    }
}

/// Expands a message ID and its parameters into English text.
pub(crate) fn render(message_id: &str, params: &[&str]) -> String {
    let template = match message_id {
        IDS_NOTIFY_DETECTING => "Detecting: {}",
        IDS_NOTIFY_OK => "OK: {}",
        IDS_NOTIFY_COLLECTING => "Collecting: {}",
        IDS_NOTIFY_STORING => "Storing: {}",
        IDS_NOTIFY_STORING_LIBRARY => "Storing library: {}",
        IDS_NOTIFY_RENAMED => "Renamed '{}' to '{}'",
        IDS_NOTIFY_RENAME_NOT_DEFINED => "No rename defined for '{}'",
        IDS_NOTIFY_SKIPPED => "Skipped {}: {}",
        IDS_NOTIFY_ERROR => "{}",
        IDS_NOTIFY_CANCELLED => "Cancelled",
        IDS_NOTIFY_NOTHING_DETECTED => "No source presets found",
        unknown => return format!("{unknown} {}", params.join(" ")),
    };

    let mut text = String::with_capacity(template.len() + 32);
    let mut remaining = template;
    let mut params = params.iter();
    while let Some(index) = remaining.find("{}") {
        text.push_str(&remaining[..index]);
        text.push_str(params.next().copied().unwrap_or(""));
        remaining = &remaining[index + 2..];
    }
    text.push_str(remaining);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_params() {
        assert_eq!(render(IDS_NOTIFY_OK, &["Piano"]), "OK: Piano");
        assert_eq!(
            render(IDS_NOTIFY_RENAMED, &["Old", "New"]),
            "Renamed 'Old' to 'New'"
        );
        assert_eq!(render(IDS_NOTIFY_CANCELLED, &[]), "Cancelled");
    }

    #[test]
    fn test_render_unknown_id_passes_through() {
        assert_eq!(render("IDS_SOMETHING", &["a", "b"]), "IDS_SOMETHING a b");
    }

    #[test]
    fn test_finished_flag() {
        let notifier = ConsoleNotifier::new();
        assert!(!notifier.is_finished());
        notifier.finished(true);
        assert!(notifier.is_finished());
        assert!(notifier.was_cancelled());
    }
}
