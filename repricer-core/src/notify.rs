//! Notification seam — chat messages, task creation, action logs.
//!
//! The engine narrates what it wants sent; delivering it is the caller's
//! business. Implementations must be cheap and infallible from the
//! engine's point of view.

use std::sync::Mutex;

/// Outbound notification sink the engines report into.
pub trait Notifier {
    /// Short chat message, usually tagging the responsible person.
    fn send_message(&self, message: &str);

    /// Follow-up task for a human.
    fn add_task(&self, task: &str);

    /// Audit-log line.
    fn add_log(&self, entry: &str);
}

/// Discards everything.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn send_message(&self, _message: &str) {}
    fn add_task(&self, _task: &str) {}
    fn add_log(&self, _entry: &str) {}
}

/// Prints notifications to stdout, prefixed by channel.
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn send_message(&self, message: &str) {
        println!("[chat] {message}");
    }

    fn add_task(&self, task: &str) {
        println!("[task] {task}");
    }

    fn add_log(&self, entry: &str) {
        println!("[log] {entry}");
    }
}

/// Buffers notifications for inspection in tests.
#[derive(Default)]
pub struct RecordingNotifier {
    inner: Mutex<Recorded>,
}

#[derive(Default, Clone)]
pub struct Recorded {
    pub messages: Vec<String>,
    pub tasks: Vec<String>,
    pub logs: Vec<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Recorded {
        self.inner.lock().expect("notifier lock poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send_message(&self, message: &str) {
        self.inner
            .lock()
            .expect("notifier lock poisoned")
            .messages
            .push(message.to_string());
    }

    fn add_task(&self, task: &str) {
        self.inner
            .lock()
            .expect("notifier lock poisoned")
            .tasks
            .push(task.to_string());
    }

    fn add_log(&self, entry: &str) {
        self.inner
            .lock()
            .expect("notifier lock poisoned")
            .logs
            .push(entry.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_keeps_channels_separate() {
        let n = RecordingNotifier::new();
        n.send_message("blocked SKU");
        n.add_task("investigate block");
        n.add_log("price update");
        let recorded = n.take();
        assert_eq!(recorded.messages, vec!["blocked SKU"]);
        assert_eq!(recorded.tasks, vec!["investigate block"]);
        assert_eq!(recorded.logs, vec!["price update"]);
    }
}
