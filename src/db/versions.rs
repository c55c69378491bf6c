//! Version registry operations.
//!
//! Every re-optimization mints exactly one row here, once, inside a single
//! transaction. Rows are never updated or deleted afterwards; the registry
//! is the append-only audit trail that makes versioned results meaningful.
//!
//! `version_id` comes from a sequence shared across projects and is strictly
//! increasing. `version_number` is the per-project display counter (1, 2,
//! 3, ...) derived from the current per-project maximum at insert time.

use super::{Database, VersionRow};
use crate::error::{StoreError, StoreResult};

impl Database {
    /// Mint a new version record for a re-optimization.
    ///
    /// `base_version_id`, when given, must name an existing version of the
    /// same project. Pending delay rows listed in `delay_ids` are stamped
    /// with the new version id in the same transaction; the record itself
    /// stores the requested id list verbatim.
    pub async fn create_version(
        &self,
        project_id: i64,
        base_version_id: Option<i64>,
        reoptimize_from: chrono::DateTime<chrono::Utc>,
        delay_ids: &[i64],
    ) -> StoreResult<VersionRow> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> =
            sqlx::query_scalar("SELECT project_id FROM projects WHERE project_id = $1")
                .bind(project_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(StoreError::UnknownProject { project_id });
        }

        if let Some(base) = base_version_id {
            let found: Option<i64> = sqlx::query_scalar(
                "SELECT version_id FROM optimization_versions
                 WHERE version_id = $1 AND project_id = $2",
            )
            .bind(base)
            .bind(project_id)
            .fetch_optional(&mut *tx)
            .await?;
            if found.is_none() {
                return Err(StoreError::UnknownBaseVersion {
                    project_id,
                    base_version_id: base,
                });
            }
        }

        let row = sqlx::query_as::<_, VersionRow>(
            "INSERT INTO optimization_versions
                (project_id, version_number, base_version_id, reoptimize_from, delay_ids)
             SELECT $1, COALESCE(MAX(version_number), 0) + 1, $2, $3, $4
             FROM optimization_versions WHERE project_id = $1
             RETURNING version_id, project_id, version_number, base_version_id,
                       reoptimize_from, delay_ids, created_at",
        )
        .bind(project_id)
        .bind(base_version_id)
        .bind(reoptimize_from)
        .bind(delay_ids)
        .fetch_one(&mut *tx)
        .await?;

        // Stamp the consumed delays. Delays already claimed by an earlier
        // version keep their original stamp.
        if !delay_ids.is_empty() {
            sqlx::query(
                "UPDATE delay_updates SET version_id = $1
                 WHERE project_id = $2 AND delay_id = ANY($3) AND version_id IS NULL",
            )
            .bind(row.version_id)
            .bind(project_id)
            .bind(delay_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(row)
    }

    /// Get one version of a project.
    pub async fn get_version(
        &self,
        project_id: i64,
        version_id: i64,
    ) -> StoreResult<Option<VersionRow>> {
        let row = sqlx::query_as::<_, VersionRow>(
            "SELECT version_id, project_id, version_number, base_version_id,
                    reoptimize_from, delay_ids, created_at
             FROM optimization_versions
             WHERE project_id = $1 AND version_id = $2",
        )
        .bind(project_id)
        .bind(version_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// List a project's versions in ascending version-number order.
    pub async fn list_versions(&self, project_id: i64) -> StoreResult<Vec<VersionRow>> {
        let rows = sqlx::query_as::<_, VersionRow>(
            "SELECT version_id, project_id, version_number, base_version_id,
                    reoptimize_from, delay_ids, created_at
             FROM optimization_versions
             WHERE project_id = $1 ORDER BY version_number",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get the most recently minted version of a project, if any.
    pub async fn latest_version(&self, project_id: i64) -> StoreResult<Option<VersionRow>> {
        let row = sqlx::query_as::<_, VersionRow>(
            "SELECT version_id, project_id, version_number, base_version_id,
                    reoptimize_from, delay_ids, created_at
             FROM optimization_versions
             WHERE project_id = $1 ORDER BY version_number DESC LIMIT 1",
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
