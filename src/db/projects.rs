//! Project registry operations.
//!
//! Projects anchor everything else: result rows, versions, delays, and
//! inventory all hang off a `project_id` with cascading deletes, so removing
//! a project removes its whole history in one statement.

use super::{Database, ProjectRow};
use crate::error::{StoreError, StoreResult};

impl Database {
    /// Register a new project. Names must be non-empty and unique.
    pub async fn create_project(&self, name: &str) -> StoreResult<ProjectRow> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::invalid("project name must not be empty"));
        }

        let row = sqlx::query_as::<_, ProjectRow>(
            "INSERT INTO projects (name) VALUES ($1)
             RETURNING project_id, name, created_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateProject {
                name: name.to_string(),
            },
            _ => StoreError::Storage(e),
        })?;
        Ok(row)
    }

    /// Get a single project by id.
    pub async fn get_project(&self, project_id: i64) -> StoreResult<Option<ProjectRow>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            "SELECT project_id, name, created_at FROM projects WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Get a single project by name.
    pub async fn find_project_by_name(&self, name: &str) -> StoreResult<Option<ProjectRow>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            "SELECT project_id, name, created_at FROM projects WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// List all projects in id order.
    pub async fn list_projects(&self) -> StoreResult<Vec<ProjectRow>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            "SELECT project_id, name, created_at FROM projects ORDER BY project_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Delete a project and, via cascade, all of its results, versions,
    /// delays, summaries, and inventory rows.
    pub async fn delete_project(&self, project_id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE project_id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::UnknownProject { project_id });
        }
        Ok(())
    }
}
