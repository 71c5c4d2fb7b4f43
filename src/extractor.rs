use regex::bytes::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::utils::error::{ExtractionError, TaskError};

/// Pulls a price out of raw page content with a task's pattern.
///
/// The pattern is compiled once, when the runner starts; each poll only
/// matches. The first capturing group holds the number.
#[derive(Debug, Clone)]
pub struct ValueExtractor {
    regex: Regex,
}

impl ValueExtractor {
    pub fn new(task: &str, pattern: &str) -> Result<Self, TaskError> {
        let regex = Regex::new(pattern)
            .map_err(|e| TaskError::config(task, "regexp", e.to_string()))?;

        // captures_len counts the implicit whole-match group
        if regex.captures_len() < 2 {
            return Err(TaskError::config(
                task,
                "regexp",
                format!("pattern {:?} has no capturing group", pattern),
            ));
        }

        Ok(Self { regex })
    }

    pub fn extract(&self, content: &[u8]) -> Result<Decimal, ExtractionError> {
        let captures = self.regex.captures(content).ok_or(ExtractionError::NoMatch)?;
        let group = captures.get(1).ok_or(ExtractionError::NoMatch)?;

        let candidate = String::from_utf8_lossy(group.as_bytes());
        parse_value(&candidate)
    }
}

/// Parses a captured candidate. Zero and negatives are rejected: a zero price
/// means the pattern hit a placeholder.
pub fn parse_value(candidate: &str) -> Result<Decimal, ExtractionError> {
    let invalid = || ExtractionError::InvalidOrZeroValue(candidate.to_string());

    let trimmed = candidate.trim();
    let value = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| invalid())?;
    if value <= Decimal::ZERO {
        return Err(invalid());
    }
    Ok(value)
}
