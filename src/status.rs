//! One-line status display shared between threads
//!
//! Any thread may set the status; the render thread reads it when the
//! status region is repainted. A notifier is called on every change so
//! the render loop can be told to repaint just that region.

use parking_lot::Mutex;

/// Importance of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusLevel {
    /// Routine information
    Info,
    /// Chatty detail, such as the pathname of the selected record
    Verbose,
    /// Something went wrong and the user should see it
    Alert,
}

type Notifier = Box<dyn Fn() + Send + Sync>;

struct Line {
    level: StatusLevel,
    text: String,
}

/// Current status message with change notification
pub struct Status {
    line: Mutex<Line>,
    notify: Mutex<Option<Notifier>>,
}

impl Status {
    pub fn new(banner: impl Into<String>) -> Self {
        Self {
            line: Mutex::new(Line {
                level: StatusLevel::Info,
                text: banner.into(),
            }),
            notify: Mutex::new(None),
        }
    }

    /// Register the callback run after every change
    pub fn set_notifier(&self, notify: impl Fn() + Send + Sync + 'static) {
        *self.notify.lock() = Some(Box::new(notify));
    }

    /// Replace the status message
    pub fn set(&self, level: StatusLevel, text: impl Into<String>) {
        {
            let mut line = self.line.lock();
            line.level = level;
            line.text = text.into();
        }

        if let Some(notify) = self.notify.lock().as_ref() {
            notify();
        }
    }

    /// Current level and a copy of the text
    pub fn get(&self) -> (StatusLevel, String) {
        let line = self.line.lock();
        (line.level, line.text.clone())
    }

    pub fn level(&self) -> StatusLevel {
        self.line.lock().level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_set_notifies() {
        let status = Status::new("banner");
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        status.set_notifier(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        status.set(StatusLevel::Alert, "disk on fire");

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(status.get(), (StatusLevel::Alert, "disk on fire".to_string()));
    }
}
