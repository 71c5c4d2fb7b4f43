pub mod task;

pub use task::{EmailTemplate, Task, MAX_PERIOD_MINUTES};
