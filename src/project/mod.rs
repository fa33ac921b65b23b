//! Project records and the store that the session layer resolves them through.

mod repository;

pub use repository::ProjectRepository;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored project.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Absolute path to the project's cloned repository, if one is configured.
    pub repo_path: Option<String>,
}

/// Fields that may be changed on an existing project.
///
/// `None` means "leave unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub repo_path: Option<String>,
}

/// Storage interface for projects.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create_project(&self, name: &str, repo_path: Option<&str>) -> Result<Project>;

    async fn find_project(&self, id: &str) -> Result<Option<Project>>;

    async fn list_projects(&self) -> Result<Vec<Project>>;

    async fn update_project(&self, id: &str, update: ProjectUpdate) -> Result<Option<Project>>;

    async fn delete_project(&self, id: &str) -> Result<bool>;
}
