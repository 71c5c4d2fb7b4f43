use regex::{Captures, Regex};
use rust_decimal::Decimal;
use std::sync::{Arc, LazyLock};

use crate::models::Task;
use crate::plugins::traits::{NotificationEvent, Notifier};
use crate::store::format_value;
use crate::utils::error::NotifyError;

const DEFAULT_SUBJECT: &str = "Price drop: {name} is now {price}";
const DEFAULT_CONTENT: &str = "{name} dropped to a new low of {price}.\n\n{url}";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(name|url|price)\}").expect("placeholder pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The task has no recipients.
    Skipped,
    Sent,
}

/// Turns an improved value into a rendered event and hands it to the transport.
#[derive(Clone)]
pub struct NotifierGateway {
    notifier: Arc<dyn Notifier>,
}

impl NotifierGateway {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    pub async fn notify(&self, task: &Task, value: Decimal) -> Result<Delivery, NotifyError> {
        if !task.has_recipients() {
            return Ok(Delivery::Skipped);
        }

        let event = render(task, value);
        self.notifier.send(&event).await?;

        tracing::info!(
            task = %task.name,
            notifier = self.notifier.name(),
            recipients = event.recipients.len(),
            "notification sent"
        );
        Ok(Delivery::Sent)
    }
}

pub fn render(task: &Task, value: Decimal) -> NotificationEvent {
    let price = format_value(value);
    let subject = template_or(&task.email.subject, DEFAULT_SUBJECT);
    let content = template_or(&task.email.content, DEFAULT_CONTENT);

    NotificationEvent {
        task: task.name.clone(),
        url: task.url.clone(),
        value,
        recipients: task.email.recipients.clone(),
        subject: substitute(subject, task, &price),
        body: substitute(content, task, &price),
    }
}

fn template_or<'a>(template: &'a str, default: &'a str) -> &'a str {
    if template.trim().is_empty() { default } else { template }
}

// Single pass: text coming from a substitution is never expanded again.
fn substitute(template: &str, task: &Task, price: &str) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match &caps[1] {
            "name" => task.name.clone(),
            "url" => task.url.clone(),
            _ => price.to_string(),
        })
        .into_owned()
}
