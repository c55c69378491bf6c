//! Embedded schema definition.
//!
//! One shared schema for all projects: every table carries a `project_id`
//! column instead of the table-per-project layout this replaces. The DDL is
//! idempotent so `ensure_schema` can run on every startup and in tests.

use super::Database;
use crate::error::StoreResult;

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    project_id  BIGSERIAL PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Immutable re-optimization history. Rows are only ever inserted;
-- version_number restarts at 1 per project while version_id stays
-- globally monotonic.
CREATE TABLE IF NOT EXISTS optimization_versions (
    version_id      BIGSERIAL PRIMARY KEY,
    project_id      BIGINT NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    version_number  INT NOT NULL,
    base_version_id BIGINT REFERENCES optimization_versions(version_id),
    reoptimize_from TIMESTAMPTZ NOT NULL,
    delay_ids       BIGINT[] NOT NULL DEFAULT '{}',
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (project_id, version_number)
);

-- version_id IS NULL marks the current result set, the only rows the
-- writer may replace.
CREATE TABLE IF NOT EXISTS solution_schedule (
    id                          BIGSERIAL PRIMARY KEY,
    project_id                  BIGINT NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    version_id                  BIGINT REFERENCES optimization_versions(version_id) ON DELETE CASCADE,
    module_id                   TEXT NOT NULL,
    module_index                INT NOT NULL,
    production_start            BIGINT NOT NULL,
    production_duration         BIGINT NOT NULL,
    transport_start             BIGINT NOT NULL,
    transport_duration          BIGINT NOT NULL,
    arrival_time                BIGINT NOT NULL,
    installation_start          BIGINT NOT NULL,
    installation_duration       BIGINT NOT NULL,
    earliest_production_start   BIGINT NOT NULL DEFAULT 0,
    earliest_transport_start    BIGINT NOT NULL DEFAULT 0,
    earliest_installation_start BIGINT NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_solution_project_version
    ON solution_schedule (project_id, version_id);

-- Delay observations; version_id stays NULL until a re-optimization
-- consumes the delay.
CREATE TABLE IF NOT EXISTS delay_updates (
    delay_id         BIGSERIAL PRIMARY KEY,
    project_id       BIGINT NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    module_id        TEXT NOT NULL,
    kind             TEXT NOT NULL,
    phase            TEXT NOT NULL,
    delay_hours      DOUBLE PRECISION NOT NULL,
    detected_at_slot BIGINT NOT NULL,
    detected_at      TIMESTAMPTZ NOT NULL,
    reason           TEXT,
    version_id       BIGINT REFERENCES optimization_versions(version_id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_delays_project_pending
    ON delay_updates (project_id) WHERE version_id IS NULL;

-- One aggregate row per (project, version), rewritten on each save.
CREATE TABLE IF NOT EXISTS optimization_summary (
    id                  BIGSERIAL PRIMARY KEY,
    project_id          BIGINT NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    version_id          BIGINT REFERENCES optimization_versions(version_id) ON DELETE CASCADE,
    objective_value     DOUBLE PRECISION NOT NULL,
    status              TEXT NOT NULL,
    project_finish_time BIGINT NOT NULL,
    num_orders          INT NOT NULL,
    order_times         BIGINT[] NOT NULL DEFAULT '{}'
);

CREATE INDEX IF NOT EXISTS idx_summary_project_version
    ON optimization_summary (project_id, version_id);

-- Inventory time series, replaced wholesale per project on each save.
CREATE TABLE IF NOT EXISTS factory_inventory (
    id         BIGSERIAL PRIMARY KEY,
    project_id BIGINT NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    time_slot  BIGINT NOT NULL,
    module_id  TEXT NOT NULL,
    quantity   INT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_factory_inventory_project
    ON factory_inventory (project_id);

CREATE TABLE IF NOT EXISTS site_inventory (
    id         BIGSERIAL PRIMARY KEY,
    project_id BIGINT NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    time_slot  BIGINT NOT NULL,
    module_id  TEXT NOT NULL,
    quantity   INT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_site_inventory_project
    ON site_inventory (project_id);
"#;

impl Database {
    /// Create all tables and indexes if they do not exist yet.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}
