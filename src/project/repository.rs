//! SQLite-backed project store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{Project, ProjectStore, ProjectUpdate};

/// Repository for project records.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: SqlitePool,
}

impl ProjectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for ProjectRepository {
    async fn create_project(&self, name: &str, repo_path: Option<&str>) -> Result<Project> {
        let id = Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO projects (id, name, repo_path) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(name)
            .bind(repo_path)
            .execute(&self.pool)
            .await
            .context("inserting project")?;

        info!("Created project {} ({})", id, name);
        Ok(Project {
            id,
            name: name.to_string(),
            repo_path: repo_path.map(str::to_string),
        })
    }

    async fn find_project(&self, id: &str) -> Result<Option<Project>> {
        sqlx::query_as::<_, Project>("SELECT id, name, repo_path FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("fetching project")
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        sqlx::query_as::<_, Project>("SELECT id, name, repo_path FROM projects ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("listing projects")
    }

    async fn update_project(&self, id: &str, update: ProjectUpdate) -> Result<Option<Project>> {
        let Some(existing) = self.find_project(id).await? else {
            return Ok(None);
        };

        let name = update.name.unwrap_or(existing.name);
        let repo_path = update.repo_path.or(existing.repo_path);

        sqlx::query("UPDATE projects SET name = ?, repo_path = ? WHERE id = ?")
            .bind(&name)
            .bind(&repo_path)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("updating project")?;

        Ok(Some(Project {
            id: id.to_string(),
            name,
            repo_path,
        }))
    }

    async fn delete_project(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting project")?;

        Ok(result.rows_affected() > 0)
    }
}
