//! Session data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Capitalized label used when rendering a transcript into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            ChatRole::User => "User",
            ChatRole::Assistant => "Assistant",
        }
    }
}

/// One entry in a session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// An active conversation bound to one project's repository.
///
/// `repo_path` is snapshotted from the project at creation time; changing the
/// project's repository later does not affect sessions already open on it.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// Unique session ID, the sole lookup key.
    pub session_id: String,
    /// When the session was created. Immutable.
    pub created_at: DateTime<Utc>,
    /// Last successful read or update. Drives idle eviction.
    pub last_accessed: DateTime<Utc>,
    /// Owning project.
    pub project_id: String,
    /// Absolute path to the project's cloned repository.
    pub repo_path: String,
    /// Ordered conversation transcript, append-only during chat exchanges.
    pub message_history: Vec<ChatMessage>,
    /// Optional user-supplied label.
    pub name: Option<String>,
}

impl Session {
    /// Convert to a summary for listings. Never exposes the transcript.
    pub fn to_info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session_id.clone(),
            created_at: self.created_at.to_rfc3339(),
            last_accessed: self.last_accessed.to_rfc3339(),
            project_id: self.project_id.clone(),
            message_count: self.message_history.len(),
            name: self.name.clone(),
        }
    }
}

/// Lightweight session summary for API listings.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub created_at: String,
    pub last_accessed: String,
    pub project_id: String,
    pub message_count: usize,
    pub name: Option<String>,
}

/// Fields that may be changed on an existing session.
///
/// `None` means "leave unchanged"; only fields explicitly present in the
/// request are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionUpdate {
    pub name: Option<String>,
}
