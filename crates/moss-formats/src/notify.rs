//! The notifier contract and the message identifiers used across the
//! conversion pipeline.
//!
//! No component writes to a console or UI directly; everything funnels
//! through a [`Notifier`]. Messages are identified by stable IDs so a
//! frontend can localize them; parameters are passed positionally.

/// A source file or folder is being analysed.
pub const IDS_NOTIFY_DETECTING: &str = "IDS_NOTIFY_DETECTING";
/// A source was processed successfully.
pub const IDS_NOTIFY_OK: &str = "IDS_NOTIFY_OK";
/// A source was added to the in-memory library batch.
pub const IDS_NOTIFY_COLLECTING: &str = "IDS_NOTIFY_COLLECTING";
/// A preset or performance file is being written.
pub const IDS_NOTIFY_STORING: &str = "IDS_NOTIFY_STORING";
/// A library file is being written.
pub const IDS_NOTIFY_STORING_LIBRARY: &str = "IDS_NOTIFY_STORING_LIBRARY";
/// A source was renamed through the rename table.
pub const IDS_NOTIFY_RENAMED: &str = "IDS_NOTIFY_RENAMED";
/// A source name had no entry in the rename table.
pub const IDS_NOTIFY_RENAME_NOT_DEFINED: &str = "IDS_NOTIFY_RENAME_NOT_DEFINED";
/// A malformed source file was skipped.
pub const IDS_NOTIFY_SKIPPED: &str = "IDS_NOTIFY_SKIPPED";
/// A conversion error occurred; the batch continues.
pub const IDS_NOTIFY_ERROR: &str = "IDS_NOTIFY_ERROR";
/// The run was cancelled.
pub const IDS_NOTIFY_CANCELLED: &str = "IDS_NOTIFY_CANCELLED";
/// No source could be detected at all.
pub const IDS_NOTIFY_NOTHING_DETECTED: &str = "IDS_NOTIFY_NOTHING_DETECTED";

/// Receiver of pipeline and plugin messages.
///
/// Implementations may be synchronous or asynchronous; callers make no
/// assumption about the thread a callback runs on.
pub trait Notifier: Sync {
    /// Logs a localized info message.
    fn log(&self, message_id: &str, params: &[&str]);

    /// Logs a localized error message.
    fn log_error(&self, message_id: &str, params: &[&str]);

    /// Logs an error with its causing error value.
    fn log_error_cause(&self, message_id: &str, error: &dyn std::error::Error) {
        let text = error.to_string();
        self.log_error(message_id, &[&text]);
    }

    /// Signals whether a frontend may offer closing the run.
    fn update_button_states(&self, _can_close: bool) {}

    /// Signals the end of a detection run. Called exactly once per run.
    fn finished(&self, _cancelled: bool) {}
}

/// A notifier that swallows everything. Useful in tests and for
/// API-level use of single plugins.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn log(&self, _message_id: &str, _params: &[&str]) {}

    fn log_error(&self, _message_id: &str, _params: &[&str]) {}
}
