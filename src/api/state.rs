//! Application state shared across handlers.

use std::sync::Arc;

use crate::agent::CodebaseQuery;
use crate::project::ProjectStore;
use crate::session::SessionManager;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session manager owning every live conversation.
    pub sessions: Arc<SessionManager>,
    /// Project store backing session creation and project CRUD.
    pub projects: Arc<dyn ProjectStore>,
    /// External codebase query service.
    pub agent: Arc<dyn CodebaseQuery>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        sessions: Arc<SessionManager>,
        projects: Arc<dyn ProjectStore>,
        agent: Arc<dyn CodebaseQuery>,
    ) -> Self {
        Self {
            sessions,
            projects,
            agent,
        }
    }
}
