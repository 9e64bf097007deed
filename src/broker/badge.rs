// src/broker/badge.rs
//! Side effects the broker has on the browser chrome: the pending-count
//! badge and user-visible notifications.
//!
//! Both are external collaborators reached through traits; the log-backed
//! implementations are used when the wallet runs headless.

use log::info;

/// Where badge text ends up (e.g. the extension action icon).
pub trait BadgeSink: Send {
    fn set_text(&self, text: &str);
}

/// Shows a notification to the user.
pub trait Notifier: Send {
    fn notify(&self, title: &str, message: &str);
}

/// Badge sink that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogBadge;

impl BadgeSink for LogBadge {
    fn set_text(&self, text: &str) {
        info!("badge: {}", text);
    }
}

/// Notifier that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) {
        info!("notification [{}] {}", title, message);
    }
}

/// Pending-request counter mirrored onto a [`BadgeSink`].
pub struct Badge {
    count: usize,
    sink: Box<dyn BadgeSink>,
}

impl Badge {
    /// Creates the counter and resets the badge to "0".
    pub fn new(sink: Box<dyn BadgeSink>) -> Self {
        sink.set_text("0");
        Badge { count: 0, sink }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn increment(&mut self) {
        self.count += 1;
        self.publish();
    }

    /// Decrements the counter, never going below zero.
    pub fn decrement(&mut self) {
        self.count = self.count.saturating_sub(1);
        self.publish();
    }

    fn publish(&self) {
        self.sink.set_text(&self.count.to_string());
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every badge text and notification for assertions.
    #[derive(Clone, Default)]
    pub struct Recorder {
        pub badge: Arc<Mutex<Vec<String>>>,
        pub notifications: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        pub fn last_badge(&self) -> Option<String> {
            self.badge.lock().unwrap().last().cloned()
        }

        pub fn notification_count(&self) -> usize {
            self.notifications.lock().unwrap().len()
        }
    }

    impl BadgeSink for Recorder {
        fn set_text(&self, text: &str) {
            self.badge.lock().unwrap().push(text.to_string());
        }
    }

    impl Notifier for Recorder {
        fn notify(&self, _title: &str, message: &str) {
            self.notifications.lock().unwrap().push(message.to_string());
        }
    }
}
