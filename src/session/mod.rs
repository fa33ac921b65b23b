//! In-memory conversational sessions.
//!
//! A session binds a conversation transcript to one project's cloned
//! repository. The [`SessionManager`] is the single authoritative registry of
//! live sessions for the process and owns their entire lifetime: creation,
//! access refresh, idle eviction by a background reaper, and the shutdown
//! drain.

mod manager;
mod models;
mod prompt;

pub use manager::{
    DEFAULT_CLEANUP_INTERVAL_SECONDS, DEFAULT_TIMEOUT_MINUTES, SessionError, SessionManager,
};
pub use models::{ChatMessage, ChatRole, Session, SessionInfo, SessionUpdate};
pub use prompt::{build_chat_prompt, format_message_history};
