use colored::Colorize;
use crmdesk::notify::{NotificationKind, Notifier};
use std::cell::Cell;
use std::rc::Rc;

/// Prints notifications as they arrive and remembers whether any of them
/// was an error, so the process can exit non-zero. Clones share the flag.
#[derive(Debug, Default, Clone)]
pub struct TerminalNotifier {
    errored: Rc<Cell<bool>>,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reported_error(&self) -> bool {
        self.errored.get()
    }
}

pub fn format_notification(kind: NotificationKind, title: &str, message: &str) -> String {
    let head = format!("{}:", title);
    match kind {
        NotificationKind::Success => format!("{} {}", head.green().bold(), message),
        NotificationKind::Error => format!("{} {}", head.red().bold(), message),
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, kind: NotificationKind, title: &str, message: &str) {
        if kind == NotificationKind::Error {
            self.errored.set(true);
        }
        println!("{}", format_notification(kind, title, message));
    }
}
