//! Subprocess-backed agent client.

use std::process::Stdio;

use async_trait::async_trait;
use log::{info, warn};
use tokio::process::Command;

use super::{AgentError, CodebaseQuery};

/// Default agent executable.
const DEFAULT_EXECUTABLE: &str = "claude";

/// Default tool allowlist: the agent may read the repository but not touch it.
const DEFAULT_ALLOWED_TOOLS: &str = "Read Glob Grep";

/// Configuration for the agent subprocess.
#[derive(Debug, Clone)]
pub struct AgentCliConfig {
    /// Agent executable to spawn.
    pub executable: String,
    /// Space-separated tool allowlist passed to the agent.
    pub allowed_tools: String,
}

impl Default for AgentCliConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            allowed_tools: DEFAULT_ALLOWED_TOOLS.to_string(),
        }
    }
}

/// Queries a codebase by spawning the agent CLI with the repository as its
/// working directory.
pub struct AgentCli {
    config: AgentCliConfig,
}

impl AgentCli {
    pub fn new(config: AgentCliConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl CodebaseQuery for AgentCli {
    async fn ask(&self, prompt: &str, repo_path: &str) -> Result<String, AgentError> {
        let mut cmd = Command::new(&self.config.executable);
        cmd.arg("-p")
            .arg(prompt)
            .arg("--allowed-tools")
            .arg(&self.config.allowed_tools)
            .current_dir(repo_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        info!("Querying agent in {}", repo_path);
        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("Agent query failed with {}: {}", output.status, stderr);
            return Err(AgentError::Failed {
                code: output.status.code(),
                stderr,
            });
        }

        let text = String::from_utf8(output.stdout)?;
        Ok(text.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_executable_surfaces_spawn_error() {
        let client = AgentCli::new(AgentCliConfig {
            executable: "kex-no-such-agent-binary".to_string(),
            ..AgentCliConfig::default()
        });

        let err = client.ask("hello", "/tmp").await.unwrap_err();
        assert!(matches!(err, AgentError::Spawn(_)));
    }
}
