//! # Database — PostgreSQL Storage Layer
//!
//! Async storage for scheduling-optimization results via `sqlx::PgPool`.
//! All projects share one schema; per-project state is keyed by a
//! `project_id` column rather than per-project tables.
//!
//! ## Schema
//!
//! - `projects`: project registry (id, unique name)
//! - `solution_schedule`: result rows; `version_id IS NULL` marks the
//!   replaceable current set, non-NULL rows are preserved history
//! - `optimization_versions`: immutable version registry (sequential
//!   per-project numbering, base-version lineage, delay references)
//! - `delay_updates`: delay observations, stamped with a version once consumed
//! - `optimization_summary`: one aggregate row per (project, version)
//! - `factory_inventory` / `site_inventory`: per-project snapshots
//!
//! ## Module Structure
//!
//! Operations are split into submodules by domain:
//!
//! - [`projects`] — project registry CRUD
//! - [`results`] — the result writer (replace / append / rewrite)
//! - [`versions`] — version minting and history queries
//! - [`delays`] — delay log
//! - [`summary`] — run summaries and inventory snapshots
//! - [`schema`] — embedded idempotent DDL

mod delays;
mod projects;
mod results;
pub mod schema;
mod summary;
mod versions;

use serde::Serialize;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::error::{StoreError, StoreResult};
use crate::schedule::ResultVersion;

// ── Row types ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProjectRow {
    pub project_id: i64,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A persisted result row. `version_id` NULL means the row belongs to the
/// current (replaceable) set.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SolutionRow {
    pub id: i64,
    pub project_id: i64,
    pub version_id: Option<i64>,
    pub module_id: String,
    pub module_index: i32,
    pub production_start: i64,
    pub production_duration: i64,
    pub transport_start: i64,
    pub transport_duration: i64,
    pub arrival_time: i64,
    pub installation_start: i64,
    pub installation_duration: i64,
    pub earliest_production_start: i64,
    pub earliest_transport_start: i64,
    pub earliest_installation_start: i64,
}

impl SolutionRow {
    pub fn version(&self) -> ResultVersion {
        ResultVersion::from_sql(self.version_id)
    }
}

/// One immutable entry in the re-optimization history.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VersionRow {
    pub version_id: i64,
    pub project_id: i64,
    pub version_number: i32,
    pub base_version_id: Option<i64>,
    pub reoptimize_from: chrono::DateTime<chrono::Utc>,
    pub delay_ids: Vec<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DelayRow {
    pub delay_id: i64,
    pub project_id: i64,
    pub module_id: String,
    pub kind: String,
    pub phase: String,
    pub delay_hours: f64,
    pub detected_at_slot: i64,
    pub detected_at: chrono::DateTime<chrono::Utc>,
    pub reason: Option<String>,
    pub version_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SummaryRow {
    pub project_id: i64,
    pub version_id: Option<i64>,
    pub objective_value: f64,
    pub status: String,
    pub project_finish_time: i64,
    pub num_orders: i32,
    pub order_times: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InventoryRow {
    pub project_id: i64,
    pub time_slot: i64,
    pub module_id: String,
    pub quantity: i32,
}

/// Result-row count for one version tag, used by the inspect report.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VersionCount {
    pub version_id: Option<i64>,
    pub count: i64,
}

/// Per-table row counts for one project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectTotals {
    pub schedule_rows: i64,
    pub versions: i64,
    pub delays: i64,
    pub pending_delays: i64,
    pub summaries: i64,
    pub factory_rows: i64,
    pub site_rows: i64,
}

// ── Database struct and connection ──────────────────────────────

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL using the provided database URL.
    ///
    /// Parses the URL by hand so percent-encoded credentials survive intact;
    /// the statement cache is disabled for pgbouncer compatibility.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let url =
            url::Url::parse(database_url).map_err(|e| StoreError::invalid_url(e.to_string()))?;
        let username = urlencoding::decode(url.username())
            .map_err(|e| StoreError::invalid_url(e.to_string()))?
            .into_owned();
        let password = match url.password() {
            Some(p) => Some(
                urlencoding::decode(p)
                    .map_err(|e| StoreError::invalid_url(e.to_string()))?
                    .into_owned(),
            ),
            None => None,
        };
        let mut opts = PgConnectOptions::new()
            .host(url.host_str().unwrap_or("localhost"))
            .port(url.port().unwrap_or(5432))
            .database(url.path().trim_start_matches('/'))
            .username(&username)
            .statement_cache_capacity(0);
        if let Some(ref pw) = password {
            opts = opts.password(pw);
        }
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(opts)
            .await?;
        Ok(Database { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Health check: execute `SELECT 1` to verify database connectivity.
    pub async fn health_check(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn solution_row(version_id: Option<i64>) -> SolutionRow {
        SolutionRow {
            id: 1,
            project_id: 1,
            version_id,
            module_id: "M-01".into(),
            module_index: 0,
            production_start: 0,
            production_duration: 1,
            transport_start: 1,
            transport_duration: 1,
            arrival_time: 2,
            installation_start: 2,
            installation_duration: 1,
            earliest_production_start: 0,
            earliest_transport_start: 0,
            earliest_installation_start: 0,
        }
    }

    #[test]
    fn solution_row_version_tag_from_nullable_column() {
        assert_eq!(solution_row(None).version(), ResultVersion::Unversioned);
        assert_eq!(
            solution_row(Some(4)).version(),
            ResultVersion::Versioned(4)
        );
    }
}
