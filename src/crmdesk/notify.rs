//! Notification sink.
//!
//! Controllers report the outcome of every user action through a
//! [`Notifier`]: a success or error toast with a title and a message. The sink
//! is fire-and-forget; nothing it does feeds back into table state.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Success => write!(f, "success"),
            NotificationKind::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

pub trait Notifier {
    fn notify(&self, kind: NotificationKind, title: &str, message: &str);

    fn success(&self, title: &str, message: &str) {
        self.notify(NotificationKind::Success, title, message);
    }

    fn error(&self, title: &str, message: &str) {
        self.notify(NotificationKind::Error, title, message);
    }
}

/// Keeps every notification in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    seen: Rc<RefCell<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        self.seen.borrow().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.seen.borrow().last().cloned()
    }

    /// Returns and clears everything recorded so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.seen.borrow_mut())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, title: &str, message: &str) {
        self.seen.borrow_mut().push(Notification {
            kind,
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}
