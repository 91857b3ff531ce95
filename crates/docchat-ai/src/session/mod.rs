//! Upload/chat session lifecycle.
//!
//! A `Session` moves `AwaitingUpload → Ready → AwaitingUpload` through
//! three commands: `submit_upload`, `ask` (plus the one-off `seed`), and
//! `cleanup`. Each command borrows the session mutably and awaits the
//! provider to completion, so a session never runs two stages at once.

mod chat;
mod cleanup;
mod manager;
mod types;
mod upload;


pub use manager::Session;
pub use types::{
    CleanupError, Phase, QueryError, SessionSettings, UploadBlob, UploadError, UploadReport,
};
