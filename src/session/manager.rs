//! Session registry with automatic idle eviction.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use log::{error, info};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::project::ProjectStore;

use super::models::{ChatMessage, Session, SessionInfo, SessionUpdate};

/// Default idle timeout before a session becomes eligible for eviction.
pub const DEFAULT_TIMEOUT_MINUTES: u64 = 30;

/// Default interval between reaper passes.
pub const DEFAULT_CLEANUP_INTERVAL_SECONDS: u64 = 60;

/// Errors from session creation.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("project {0} not found")]
    ProjectNotFound(String),

    #[error("project {0} does not have a repo_path set; add a codebase first")]
    RepoPathNotSet(String),

    /// A freshly generated ID matched a live session. Should never happen;
    /// surfaced loudly instead of overwriting the existing session.
    #[error("generated session id {0} collides with a live session")]
    IdCollision(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Handle to the running reaper task.
struct ReaperHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Authoritative in-memory registry of live sessions.
///
/// All registry operations are bounded in-memory steps and never hold a map
/// lock across an await point; the suspending work around them (project
/// lookup, agent query, reaper sleep) happens outside the map.
pub struct SessionManager {
    sessions: DashMap<String, Session>,
    idle_timeout: Duration,
    cleanup_interval: Duration,
    reaper: Mutex<Option<ReaperHandle>>,
}

impl SessionManager {
    /// Create a manager with the default timeout and reaper interval.
    pub fn new() -> Self {
        Self::with_config(
            Duration::from_secs(DEFAULT_TIMEOUT_MINUTES * 60),
            Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECONDS),
        )
    }

    /// Create a manager with an explicit idle timeout and reaper interval.
    pub fn with_config(idle_timeout: Duration, cleanup_interval: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout,
            cleanup_interval,
            reaper: Mutex::new(None),
        }
    }

    /// Create a new session for a project.
    ///
    /// Resolves the project through `projects` and snapshots its `repo_path`
    /// into the session. Fails with [`SessionError::ProjectNotFound`] if no
    /// project matches and [`SessionError::RepoPathNotSet`] if the project
    /// exists but has no repository configured.
    pub async fn create_session(
        &self,
        project_id: &str,
        projects: &dyn ProjectStore,
        name: Option<String>,
    ) -> Result<Session, SessionError> {
        let project = projects
            .find_project(project_id)
            .await?
            .ok_or_else(|| SessionError::ProjectNotFound(project_id.to_string()))?;

        let repo_path = match project.repo_path {
            Some(path) if !path.is_empty() => path,
            _ => return Err(SessionError::RepoPathNotSet(project_id.to_string())),
        };

        let session_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let session = Session {
            session_id: session_id.clone(),
            created_at: now,
            last_accessed: now,
            project_id: project_id.to_string(),
            repo_path,
            message_history: Vec::new(),
            name,
        };

        match self.sessions.entry(session_id.clone()) {
            Entry::Occupied(_) => return Err(SessionError::IdCollision(session_id)),
            Entry::Vacant(slot) => {
                slot.insert(session.clone());
            }
        }

        info!("Created session {} for project {}", session_id, project_id);
        Ok(session)
    }

    /// Get a session by ID, refreshing `last_accessed` on a hit.
    pub fn get_session(&self, session_id: &str) -> Option<Session> {
        let mut entry = self.sessions.get_mut(session_id)?;
        let session = &mut *entry;
        let now = Utc::now();
        if now > session.last_accessed {
            session.last_accessed = now;
        }
        Some(session.clone())
    }

    /// Apply the fields present in `update` and refresh `last_accessed`.
    ///
    /// Returns the updated session, or `None` if it does not exist.
    pub fn update_session(&self, session_id: &str, update: SessionUpdate) -> Option<Session> {
        let mut entry = self.sessions.get_mut(session_id)?;
        let session = &mut *entry;

        if let Some(name) = update.name {
            session.name = Some(name);
        }

        let now = Utc::now();
        if now > session.last_accessed {
            session.last_accessed = now;
        }

        info!("Updated session {}", session_id);
        Some(session.clone())
    }

    /// Delete a session. Returns whether a removal occurred.
    pub fn delete_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            info!("Deleted session {}", session_id);
        }
        removed
    }

    /// List summaries of all live sessions, optionally filtered by project.
    ///
    /// Does not refresh `last_accessed`.
    pub fn list_sessions(&self, project_id: Option<&str>) -> Vec<SessionInfo> {
        self.sessions
            .iter()
            .filter(|entry| project_id.is_none_or(|id| entry.project_id == id))
            .map(|entry| entry.to_info())
            .collect()
    }

    /// Append one user/assistant exchange to a session's transcript and
    /// refresh `last_accessed`. Returns the new message count, or `None` if
    /// the session no longer exists.
    ///
    /// Called only after the external agent call has succeeded, so a failed
    /// exchange never leaves a partial transcript behind.
    pub fn append_exchange(
        &self,
        session_id: &str,
        user_message: &str,
        assistant_reply: &str,
    ) -> Option<usize> {
        let mut entry = self.sessions.get_mut(session_id)?;
        let session = &mut *entry;

        session.message_history.push(ChatMessage::user(user_message));
        session
            .message_history
            .push(ChatMessage::assistant(assistant_reply));

        let now = Utc::now();
        if now > session.last_accessed {
            session.last_accessed = now;
        }

        Some(session.message_history.len())
    }

    /// Remove every session idle longer than the configured timeout.
    ///
    /// The whole pass uses one `now` snapshot, and each candidate is
    /// re-checked at removal so a concurrent access refresh can still save
    /// it. Returns the number of sessions removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let expired = |session: &Session| {
            (now - session.last_accessed)
                .to_std()
                .unwrap_or_default()
                > self.idle_timeout
        };

        let candidates: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| expired(entry))
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0;
        for session_id in candidates {
            if self
                .sessions
                .remove_if(&session_id, |_, session| expired(session))
                .is_some()
            {
                info!("Evicted idle session {}", session_id);
                removed += 1;
            }
        }
        removed
    }

    /// Start the background reaper. No-op if it is already running.
    pub fn start_cleanup_task(self: Arc<Self>) {
        let mut guard = self.reaper.lock().unwrap_or_else(|e| e.into_inner());
        if guard.as_ref().is_some_and(|handle| !handle.task.is_finished()) {
            return;
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let interval = self.cleanup_interval;
        let manager = Arc::clone(&self);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {
                        let count = manager.cleanup_expired();
                        if count > 0 {
                            info!("Cleaned up {} expired sessions", count);
                        }
                    }
                }
            }
        });

        *guard = Some(ReaperHandle { cancel, task });
        info!("Session cleanup task started");
    }

    /// Stop the background reaper, cancelling its in-flight sleep.
    ///
    /// Returns only once the task has fully terminated; no detached work
    /// survives past this call.
    pub async fn stop_cleanup_task(&self) {
        let handle = {
            let mut guard = self.reaper.lock().unwrap_or_else(|e| e.into_inner());
            guard.take()
        };

        if let Some(ReaperHandle { cancel, task }) = handle {
            cancel.cancel();
            if let Err(e) = task.await {
                if e.is_panic() {
                    error!("Session cleanup task panicked: {}", e);
                }
            }
            info!("Session cleanup task stopped");
        }
    }

    /// Whether the reaper task is currently running.
    pub fn is_cleanup_running(&self) -> bool {
        self.reaper
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|handle| !handle.task.is_finished())
    }

    /// Unconditionally drop every session. Called at shutdown after the
    /// reaper has been stopped.
    pub fn close_all_sessions(&self) {
        let count = self.sessions.len();
        self.sessions.clear();
        info!("Closed {} sessions", count);
    }

    /// Shift a session's timestamps into the past.
    #[cfg(test)]
    fn backdate(&self, session_id: &str, by: Duration) {
        if let Some(mut entry) = self.sessions.get_mut(session_id) {
            let delta = chrono::Duration::from_std(by).unwrap();
            entry.created_at -= delta;
            entry.last_accessed -= delta;
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
