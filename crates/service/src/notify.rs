//! User-facing notification sink.
//!
//! The store reports outcomes here as a side channel; nothing is awaited or
//! read back.

/// One-way success/failure messages for the person using the directory.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Recording notifier for tests and doc examples.
pub mod mock {
    use super::Notifier;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Notification {
        Success(String),
        Error(String),
    }

    #[derive(Default)]
    pub struct RecordingNotifier {
        events: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        pub fn events(&self) -> Vec<Notification> {
            self.events.lock().unwrap().clone()
        }

        pub fn successes(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|n| match n { Notification::Success(m) => Some(m), _ => None })
                .collect()
        }

        pub fn errors(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|n| match n { Notification::Error(m) => Some(m), _ => None })
                .collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn success(&self, message: &str) {
            self.events.lock().unwrap().push(Notification::Success(message.to_string()));
        }

        fn error(&self, message: &str) {
            self.events.lock().unwrap().push(Notification::Error(message.to_string()));
        }
    }
}
