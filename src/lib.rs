pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod models;
pub mod notification;
pub mod plugins;
pub mod runner;
pub mod store;
pub mod supervisor;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use models::Task;
pub use runner::{PollOutcome, RunnerContext, TaskRunner};
pub use supervisor::{RunSummary, Supervisor};
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
