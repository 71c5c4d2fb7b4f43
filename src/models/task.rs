use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::utils::error::TaskError;

/// Longest accepted poll period: one leap year, in minutes.
pub const MAX_PERIOD_MINUTES: i64 = 366 * 24 * 60;

/// Subject/content templates and recipients for a task's alerts.
///
/// Templates may contain `{name}`, `{url}` and `{price}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EmailTemplate {
    #[serde(alias = "recipients")]
    pub recipients: Vec<String>,
    #[serde(alias = "subject")]
    pub subject: String,
    #[serde(alias = "content")]
    pub content: String,
}

/// One monitored page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Task {
    #[serde(alias = "name", default)]
    pub name: String,
    #[serde(alias = "description", default)]
    pub description: String,
    #[serde(alias = "url", default)]
    pub url: String,
    #[serde(alias = "regexp", default)]
    pub regexp: String,
    /// Poll period in minutes.
    #[serde(alias = "period", default)]
    pub period: i64,
    #[serde(alias = "email", default)]
    pub email: EmailTemplate,
}

impl Task {
    pub fn new(name: &str, url: &str, regexp: &str, period: i64) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            url: url.to_string(),
            regexp: regexp.to_string(),
            period,
            email: EmailTemplate::default(),
        }
    }

    pub fn with_recipients(mut self, recipients: &[&str]) -> Self {
        self.email.recipients = recipients.iter().map(|r| r.to_string()).collect();
        self
    }

    /// Clamped to `1..=MAX_PERIOD_MINUTES`; `validate` rejects anything outside.
    pub fn period_duration(&self) -> Duration {
        let minutes = self.period.clamp(1, MAX_PERIOD_MINUTES) as u32;
        Duration::from_secs(60).saturating_mul(minutes)
    }

    pub fn has_recipients(&self) -> bool {
        !self.email.recipients.is_empty()
    }

    /// Checks name, url and period. The pattern is checked when the extractor
    /// compiles it.
    pub fn validate(&self) -> Result<(), TaskError> {
        validate_name(&self.name)?;
        self.validate_url()?;
        if self.regexp.trim().is_empty() {
            return Err(TaskError::config(&self.name, "regexp", "regexp is empty"));
        }
        if self.period < 1 {
            return Err(TaskError::config(
                &self.name,
                "period",
                format!("period must be at least 1 minute, got {}", self.period),
            ));
        }
        if self.period > MAX_PERIOD_MINUTES {
            return Err(TaskError::config(
                &self.name,
                "period",
                format!(
                    "period must be at most {} minutes, got {}",
                    MAX_PERIOD_MINUTES, self.period
                ),
            ));
        }
        Ok(())
    }

    fn validate_url(&self) -> Result<(), TaskError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(TaskError::config(&self.name, "url", "url is empty"));
        }
        match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
            Ok(parsed) => Err(TaskError::config(
                &self.name,
                "url",
                format!("unsupported scheme {:?}", parsed.scheme()),
            )),
            Err(e) => Err(TaskError::config(&self.name, "url", format!("{}: {}", url, e))),
        }
    }
}

fn validate_name(name: &str) -> Result<(), TaskError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TaskError::config(name, "name", "name is empty"));
    }
    // The name doubles as the storage key.
    if trimmed == "." || trimmed == ".." || name.contains(['/', '\\', '\0']) {
        return Err(TaskError::config(
            name,
            "name",
            "name must be usable as a file name",
        ));
    }
    Ok(())
}
