pub mod notifiers;
pub mod traits;

pub use traits::{NotificationEvent, Notifier};
