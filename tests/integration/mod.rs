// Shared helpers for the end-to-end tests.

pub mod config_tests;
pub mod runner_tests;

use async_trait::async_trait;
use pricewatch::plugins::{NotificationEvent, Notifier};
use pricewatch::utils::error::NotifyError;
use std::sync::Mutex;

/// Keeps every event it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<NotificationEvent>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(event.clone());
        if self.fail {
            return Err(NotifyError::Transport("mail server unavailable".to_string()));
        }
        Ok(())
    }
}
