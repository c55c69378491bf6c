//! The result writer: replace and append semantics for solution rows.
//!
//! One rule governs everything here: rows written without a version
//! (`version_id IS NULL`) form the current result set and may be replaced;
//! rows written under a minted version are history and are never deleted by
//! the writer. Each write is a single transaction, so a failed run can never
//! leave a half-replaced result set behind.

use super::{Database, ProjectTotals, SolutionRow, VersionCount};
use crate::error::{StoreError, StoreResult};
use crate::schedule::{ResultVersion, ScheduleRow};

impl Database {
    /// Write a result set for a project.
    ///
    /// With [`ResultVersion::Unversioned`] the project's current rows (and
    /// only those) are purged and replaced by `rows`; versioned history is
    /// left untouched. With [`ResultVersion::Versioned`] the rows are
    /// appended under that version and nothing is deleted. The version must
    /// already exist for the project.
    pub async fn write_results(
        &self,
        project_id: i64,
        rows: &[ScheduleRow],
        version: ResultVersion,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> =
            sqlx::query_scalar("SELECT project_id FROM projects WHERE project_id = $1")
                .bind(project_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(StoreError::UnknownProject { project_id });
        }

        match version {
            ResultVersion::Unversioned => {
                sqlx::query(
                    "DELETE FROM solution_schedule
                     WHERE project_id = $1 AND version_id IS NULL",
                )
                .bind(project_id)
                .execute(&mut *tx)
                .await?;
            }
            ResultVersion::Versioned(version_id) => {
                let found: Option<i64> = sqlx::query_scalar(
                    "SELECT version_id FROM optimization_versions
                     WHERE version_id = $1 AND project_id = $2",
                )
                .bind(version_id)
                .bind(project_id)
                .fetch_optional(&mut *tx)
                .await?;
                if found.is_none() {
                    return Err(StoreError::UnknownVersion {
                        project_id,
                        version_id,
                    });
                }
            }
        }

        insert_rows(&mut tx, project_id, version.as_sql(), rows).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Replace exactly one version's rows with a fresh result set.
    ///
    /// For idempotent re-saves of a re-solve: the named version's rows are
    /// deleted and rewritten; the current set and every other version stay
    /// untouched.
    pub async fn rewrite_version(
        &self,
        project_id: i64,
        version_id: i64,
        rows: &[ScheduleRow],
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let found: Option<i64> = sqlx::query_scalar(
            "SELECT version_id FROM optimization_versions
             WHERE version_id = $1 AND project_id = $2",
        )
        .bind(version_id)
        .bind(project_id)
        .fetch_optional(&mut *tx)
        .await?;
        if found.is_none() {
            return Err(StoreError::UnknownVersion {
                project_id,
                version_id,
            });
        }

        sqlx::query("DELETE FROM solution_schedule WHERE project_id = $1 AND version_id = $2")
            .bind(project_id)
            .bind(version_id)
            .execute(&mut *tx)
            .await?;

        insert_rows(&mut tx, project_id, Some(version_id), rows).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Get one result set: the current rows or one version's rows.
    pub async fn get_results(
        &self,
        project_id: i64,
        version: ResultVersion,
    ) -> StoreResult<Vec<SolutionRow>> {
        let rows = match version {
            ResultVersion::Unversioned => {
                sqlx::query_as::<_, SolutionRow>(
                    "SELECT id, project_id, version_id, module_id, module_index,
                            production_start, production_duration,
                            transport_start, transport_duration, arrival_time,
                            installation_start, installation_duration,
                            earliest_production_start, earliest_transport_start,
                            earliest_installation_start
                     FROM solution_schedule
                     WHERE project_id = $1 AND version_id IS NULL
                     ORDER BY module_index",
                )
                .bind(project_id)
                .fetch_all(&self.pool)
                .await?
            }
            ResultVersion::Versioned(version_id) => {
                sqlx::query_as::<_, SolutionRow>(
                    "SELECT id, project_id, version_id, module_id, module_index,
                            production_start, production_duration,
                            transport_start, transport_duration, arrival_time,
                            installation_start, installation_duration,
                            earliest_production_start, earliest_transport_start,
                            earliest_installation_start
                     FROM solution_schedule
                     WHERE project_id = $1 AND version_id = $2
                     ORDER BY module_index",
                )
                .bind(project_id)
                .bind(version_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    /// Get every result row of a project across all versions, current set
    /// first.
    pub async fn get_all_results(&self, project_id: i64) -> StoreResult<Vec<SolutionRow>> {
        let rows = sqlx::query_as::<_, SolutionRow>(
            "SELECT id, project_id, version_id, module_id, module_index,
                    production_start, production_duration,
                    transport_start, transport_duration, arrival_time,
                    installation_start, installation_duration,
                    earliest_production_start, earliest_transport_start,
                    earliest_installation_start
             FROM solution_schedule
             WHERE project_id = $1
             ORDER BY version_id NULLS FIRST, module_index",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ── Inspection ──────────────────────────────────────────────

    /// Row counts per version tag, current set first.
    pub async fn version_distribution(&self, project_id: i64) -> StoreResult<Vec<VersionCount>> {
        let rows = sqlx::query_as::<_, VersionCount>(
            "SELECT version_id, COUNT(*) AS count
             FROM solution_schedule
             WHERE project_id = $1
             GROUP BY version_id
             ORDER BY version_id NULLS FIRST",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Row counts across a project's tables, for the inspect report.
    pub async fn project_totals(&self, project_id: i64) -> StoreResult<ProjectTotals> {
        let schedule_rows: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM solution_schedule WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(&self.pool)
                .await?;
        let versions: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM optimization_versions WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(&self.pool)
                .await?;
        let delays: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM delay_updates WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(&self.pool)
                .await?;
        let pending_delays: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM delay_updates WHERE project_id = $1 AND version_id IS NULL",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;
        let summaries: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM optimization_summary WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(&self.pool)
                .await?;
        let factory_rows: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM factory_inventory WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(&self.pool)
                .await?;
        let site_rows: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM site_inventory WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(ProjectTotals {
            schedule_rows,
            versions,
            delays,
            pending_delays,
            summaries,
            factory_rows,
            site_rows,
        })
    }
}

/// Insert result rows under one version tag inside an open transaction.
async fn insert_rows(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    project_id: i64,
    version_id: Option<i64>,
    rows: &[ScheduleRow],
) -> StoreResult<()> {
    for row in rows {
        sqlx::query(
            "INSERT INTO solution_schedule
                (project_id, version_id, module_id, module_index,
                 production_start, production_duration,
                 transport_start, transport_duration, arrival_time,
                 installation_start, installation_duration,
                 earliest_production_start, earliest_transport_start,
                 earliest_installation_start)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(project_id)
        .bind(version_id)
        .bind(&row.module_id)
        .bind(row.module_index)
        .bind(row.production_start)
        .bind(row.production_duration)
        .bind(row.transport_start)
        .bind(row.transport_duration)
        .bind(row.arrival_time)
        .bind(row.installation_start)
        .bind(row.installation_duration)
        .bind(row.earliest_production_start)
        .bind(row.earliest_transport_start)
        .bind(row.earliest_installation_start)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
