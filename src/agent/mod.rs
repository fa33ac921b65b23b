//! Codebase query boundary.
//!
//! Asks an external AI coding agent natural-language questions about a
//! repository's contents. The session layer never calls this directly; the
//! chat handler invokes it between registry operations so no registry lock is
//! ever held across the (potentially tens of seconds long) call.

mod client;

pub use client::{AgentCli, AgentCliConfig};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the external agent call.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The agent executable could not be run at all.
    #[error("failed to run agent: {0}")]
    Spawn(#[from] std::io::Error),

    /// The agent ran but exited unsuccessfully.
    #[error("agent exited with status {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    /// The agent produced output that was not valid UTF-8.
    #[error("agent produced non-UTF-8 output")]
    InvalidOutput(#[from] std::string::FromUtf8Error),
}

/// Answers questions about a repository's contents.
///
/// Implementations may take tens of seconds and may fail; no retry is
/// performed on this side of the boundary.
#[async_trait]
pub trait CodebaseQuery: Send + Sync {
    async fn ask(&self, prompt: &str, repo_path: &str) -> Result<String, AgentError>;
}
