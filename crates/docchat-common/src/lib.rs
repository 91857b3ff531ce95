pub mod errors;
pub mod id;
pub mod notifications;

pub use errors::{ConfigError, DocchatError};
pub use id::{new_correlation_id, SessionId};
pub use notifications::{log_notifier, Notification, NotificationLevel, Notifier};
