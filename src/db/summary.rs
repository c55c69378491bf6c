//! Run summaries and inventory snapshots.
//!
//! Summaries follow the same version convention as result rows but are
//! rewritten per version on each save: one aggregate row per
//! (project, version) pair. Inventory tables carry no version at all and
//! are replaced wholesale per project.

use super::{Database, InventoryRow, SummaryRow};
use crate::error::{StoreError, StoreResult};
use crate::schedule::{InventoryLevel, ResultVersion, RunSummary};

impl Database {
    /// Write the aggregate metrics for one run, replacing any earlier
    /// summary recorded under the same version tag.
    pub async fn write_summary(
        &self,
        project_id: i64,
        version: ResultVersion,
        summary: &RunSummary,
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
                    "DELETE FROM optimization_summary
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
                sqlx::query(
                    "DELETE FROM optimization_summary
                     WHERE project_id = $1 AND version_id = $2",
                )
                .bind(project_id)
                .bind(version_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        sqlx::query(
            "INSERT INTO optimization_summary
                (project_id, version_id, objective_value, status,
                 project_finish_time, num_orders, order_times)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(project_id)
        .bind(version.as_sql())
        .bind(summary.objective_value)
        .bind(&summary.status)
        .bind(summary.project_finish_time)
        .bind(summary.num_orders)
        .bind(&summary.order_times)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Get the summary recorded under one version tag.
    pub async fn get_summary(
        &self,
        project_id: i64,
        version: ResultVersion,
    ) -> StoreResult<Option<SummaryRow>> {
        let row = match version {
            ResultVersion::Unversioned => {
                sqlx::query_as::<_, SummaryRow>(
                    "SELECT project_id, version_id, objective_value, status,
                            project_finish_time, num_orders, order_times
                     FROM optimization_summary
                     WHERE project_id = $1 AND version_id IS NULL",
                )
                .bind(project_id)
                .fetch_optional(&self.pool)
                .await?
            }
            ResultVersion::Versioned(version_id) => {
                sqlx::query_as::<_, SummaryRow>(
                    "SELECT project_id, version_id, objective_value, status,
                            project_finish_time, num_orders, order_times
                     FROM optimization_summary
                     WHERE project_id = $1 AND version_id = $2",
                )
                .bind(project_id)
                .bind(version_id)
                .fetch_optional(&self.pool)
                .await?
            }
        };
        Ok(row)
    }

    /// All summaries for a project, current set first.
    pub async fn list_summaries(&self, project_id: i64) -> StoreResult<Vec<SummaryRow>> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            "SELECT project_id, version_id, objective_value, status,
                    project_finish_time, num_orders, order_times
             FROM optimization_summary
             WHERE project_id = $1
             ORDER BY version_id NULLS FIRST",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ── Inventory snapshots ─────────────────────────────────────

    /// Replace the factory inventory time series for a project.
    pub async fn replace_factory_inventory(
        &self,
        project_id: i64,
        levels: &[InventoryLevel],
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

        sqlx::query("DELETE FROM factory_inventory WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        for level in levels {
            sqlx::query(
                "INSERT INTO factory_inventory (project_id, time_slot, module_id, quantity)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(project_id)
            .bind(level.time_slot)
            .bind(&level.module_id)
            .bind(level.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Replace the site inventory time series for a project.
    pub async fn replace_site_inventory(
        &self,
        project_id: i64,
        levels: &[InventoryLevel],
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

        sqlx::query("DELETE FROM site_inventory WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        for level in levels {
            sqlx::query(
                "INSERT INTO site_inventory (project_id, time_slot, module_id, quantity)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(project_id)
            .bind(level.time_slot)
            .bind(&level.module_id)
            .bind(level.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Read back the factory inventory, ordered by slot then module.
    pub async fn factory_inventory(&self, project_id: i64) -> StoreResult<Vec<InventoryRow>> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            "SELECT project_id, time_slot, module_id, quantity
             FROM factory_inventory
             WHERE project_id = $1 ORDER BY time_slot, module_id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Read back the site inventory, ordered by slot then module.
    pub async fn site_inventory(&self, project_id: i64) -> StoreResult<Vec<InventoryRow>> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            "SELECT project_id, time_slot, module_id, quantity
             FROM site_inventory
             WHERE project_id = $1 ORDER BY time_slot, module_id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
