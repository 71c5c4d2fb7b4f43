use rust_decimal::Decimal;
use thiserror::Error;

/// Process-level failures. Nothing a single task does ends up here.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Metrics error: {0}")]
    Metrics(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("pattern did not match the fetched content")]
    NoMatch,

    #[error("captured value {0:?} is not a positive number")]
    InvalidOrZeroValue(String),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to read body: {0}")]
    Body(#[source] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("invalid address {address:?}: {message}")]
    Address { address: String, message: String },

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Reasons a task runner stops for good.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("task {task:?}: invalid {field}: {reason}")]
    Config {
        task: String,
        field: &'static str,
        reason: String,
    },

    #[error("task {task:?}: failed to persist best value {value}: {source}")]
    Persistence {
        task: String,
        value: Decimal,
        #[source]
        source: StoreError,
    },
}

impl TaskError {
    pub fn config(task: &str, field: &'static str, reason: impl Into<String>) -> Self {
        TaskError::Config {
            task: task.to_string(),
            field,
            reason: reason.into(),
        }
    }

    pub fn task(&self) -> &str {
        match self {
            TaskError::Config { task, .. } | TaskError::Persistence { task, .. } => task,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
