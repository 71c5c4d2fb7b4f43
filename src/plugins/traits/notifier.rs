use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::utils::error::NotifyError;

/// A rendered alert for one improved price, ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub task: String,
    pub url: String,
    pub value: Decimal,
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Delivery channel for notification events (SMTP, ...).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Sends one event to all of its recipients.
    async fn send(&self, event: &NotificationEvent) -> Result<(), NotifyError>;
}
