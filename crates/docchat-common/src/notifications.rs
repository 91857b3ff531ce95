use std::time::Duration;

use serde::Serialize;

/// Severity level for transient toast notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Warning,
}

/// A fire-and-forget notification shown to the user and dismissed after `ttl`.
///
/// Notifications are a side channel only: nothing in the session state
/// machine depends on whether they are delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
    pub ttl: Duration,
}

impl Notification {
    /// Creates a success notification with the given TTL.
    pub fn success(text: impl Into<String>, ttl: Duration) -> Self {
        Self {
            level: NotificationLevel::Success,
            text: text.into(),
            ttl,
        }
    }

    /// Creates a warning notification with an 8-second TTL.
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            text: text.into(),
            ttl: Duration::from_secs(8),
        }
    }

    pub fn ttl_ms(&self) -> u64 {
        u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Callback receiving notifications as they are emitted.
pub type Notifier = Box<dyn Fn(Notification) + Send + Sync>;

/// A notifier that only writes to the log, for sessions with no UI attached.
pub fn log_notifier() -> Notifier {
    Box::new(|n: Notification| match n.level {
        NotificationLevel::Warning => tracing::warn!("{}", n.text),
        NotificationLevel::Success => tracing::info!("{}", n.text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_keeps_requested_ttl() {
        let n = Notification::success("Uploaded file: files/abc", Duration::from_secs(2));
        assert_eq!(n.level, NotificationLevel::Success);
        assert_eq!(n.ttl_ms(), 2000);
        assert_eq!(n.text, "Uploaded file: files/abc");
    }

    #[test]
    fn warning_outlives_default_toasts() {
        let n = Notification::warning("1 of 2 file(s) could not be deleted.");
        assert_eq!(n.level, NotificationLevel::Warning);
        assert_eq!(n.ttl_ms(), 8000);
    }

    #[test]
    fn level_serializes_lowercase() {
        let json = serde_json::to_string(&NotificationLevel::Success).unwrap();
        assert_eq!(json, "\"success\"");
    }

    #[test]
    fn log_notifier_accepts_every_level() {
        let notify = log_notifier();
        notify(Notification::success("ok", Duration::from_millis(1)));
        notify(Notification::warning("warn"));
    }
}
