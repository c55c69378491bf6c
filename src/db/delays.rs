//! Delay log operations.
//!
//! Delay observations arrive from the field with no version attached. They
//! stay pending until `create_version` consumes them for a re-optimization,
//! which stamps them with the minted version id.

use super::{Database, DelayRow};
use crate::error::{StoreError, StoreResult};
use crate::schedule::NewDelay;

impl Database {
    /// Record one delay observation as pending.
    pub async fn record_delay(&self, project_id: i64, delay: &NewDelay) -> StoreResult<DelayRow> {
        if delay.module_id.trim().is_empty() {
            return Err(StoreError::invalid("module id must not be empty"));
        }
        if delay.delay_hours <= 0.0 {
            return Err(StoreError::invalid("delay hours must be positive"));
        }

        let exists: Option<i64> =
            sqlx::query_scalar("SELECT project_id FROM projects WHERE project_id = $1")
                .bind(project_id)
                .fetch_optional(&self.pool)
                .await?;
        if exists.is_none() {
            return Err(StoreError::UnknownProject { project_id });
        }

        let row = sqlx::query_as::<_, DelayRow>(
            "INSERT INTO delay_updates
                (project_id, module_id, kind, phase, delay_hours,
                 detected_at_slot, detected_at, reason)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING delay_id, project_id, module_id, kind, phase, delay_hours,
                       detected_at_slot, detected_at, reason, version_id",
        )
        .bind(project_id)
        .bind(&delay.module_id)
        .bind(delay.kind.as_str())
        .bind(delay.phase.as_str())
        .bind(delay.delay_hours)
        .bind(delay.detected_at_slot)
        .bind(delay.detected_at)
        .bind(&delay.reason)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// List every delay recorded for a project, oldest first.
    pub async fn list_delays(&self, project_id: i64) -> StoreResult<Vec<DelayRow>> {
        let rows = sqlx::query_as::<_, DelayRow>(
            "SELECT delay_id, project_id, module_id, kind, phase, delay_hours,
                    detected_at_slot, detected_at, reason, version_id
             FROM delay_updates
             WHERE project_id = $1 ORDER BY delay_id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Delays not yet consumed by any version.
    pub async fn pending_delays(&self, project_id: i64) -> StoreResult<Vec<DelayRow>> {
        let rows = sqlx::query_as::<_, DelayRow>(
            "SELECT delay_id, project_id, module_id, kind, phase, delay_hours,
                    detected_at_slot, detected_at, reason, version_id
             FROM delay_updates
             WHERE project_id = $1 AND version_id IS NULL ORDER BY delay_id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Delays consumed by one version.
    pub async fn delays_for_version(
        &self,
        project_id: i64,
        version_id: i64,
    ) -> StoreResult<Vec<DelayRow>> {
        let rows = sqlx::query_as::<_, DelayRow>(
            "SELECT delay_id, project_id, module_id, kind, phase, delay_hours,
                    detected_at_slot, detected_at, reason, version_id
             FROM delay_updates
             WHERE project_id = $1 AND version_id = $2 ORDER BY delay_id",
        )
        .bind(project_id)
        .bind(version_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
