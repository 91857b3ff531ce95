//! Session struct and state accessors.

use docchat_common::{Notification, Notifier};

use crate::token_tracker::TokenTracker;
use crate::{FileHandle, Message};

use super::types::{Phase, SessionSettings};

/// The complete mutable state of one upload-and-chat interaction.
pub struct Session {
    pub(super) phase: Phase,
    /// Replaced wholesale on upload, emptied on cleanup.
    pub(super) active_files: Vec<FileHandle>,
    /// Append-only conversation, user and assistant alternating.
    pub(super) transcript: Vec<Message>,
    pub(super) settings: SessionSettings,
    pub(super) tracker: TokenTracker,
    pub(super) notifier: Option<Notifier>,
}

impl Session {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            phase: Phase::AwaitingUpload,
            active_files: Vec::new(),
            transcript: Vec::new(),
            settings,
            tracker: TokenTracker::new(),
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Replace the notification sink, e.g. when a new connection attaches.
    pub fn set_notifier(&mut self, notifier: Option<Notifier>) {
        self.notifier = notifier;
    }

    pub(super) fn notify(&self, notification: Notification) {
        if let Some(ref notify) = self.notifier {
            notify(notification);
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn active_files(&self) -> &[FileHandle] {
        &self.active_files
    }

    /// Get the full conversation history.
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn tracker(&self) -> &TokenTracker {
        &self.tracker
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}
