//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Once;

use replan::schedule::{DelayKind, DelayPhase, NewDelay, RunSummary, ScheduleRow};

/// Returns the test database URL from the `TEST_DATABASE_URL` environment variable.
/// Panics if the variable is not set.
pub fn test_db_url() -> String {
    std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set for integration tests")
}

/// Returns true if the test database URL is configured.
pub fn has_test_db() -> bool {
    std::env::var("TEST_DATABASE_URL").is_ok()
}

/// One-time schema initialization.
static SCHEMA_INIT: Once = Once::new();

/// Ensure the test database schema is set up (applies the embedded DDL once
/// per test suite).
pub fn ensure_schema() {
    SCHEMA_INIT.call_once(|| {
        // Run on a scratch thread so the one-time runtime is never created
        // inside a runtime already driving the calling test.
        std::thread::spawn(|| {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let pool = sqlx::PgPool::connect(&test_db_url()).await.unwrap();
                sqlx::raw_sql(replan::db::schema::SCHEMA)
                    .execute(&pool)
                    .await
                    .unwrap();
            });
        })
        .join()
        .unwrap();
    });
}

/// Connect to the test database (also ensures schema is set up).
pub async fn setup_test_db() -> replan::db::Database {
    ensure_schema();
    let db = replan::db::Database::connect(&test_db_url())
        .await
        .expect("Failed to connect to test database");
    truncate_all_tables(db.pool()).await;
    db
}

/// Truncate all tables to ensure test isolation.
pub async fn truncate_all_tables(pool: &sqlx::PgPool) {
    sqlx::raw_sql(
        "TRUNCATE TABLE site_inventory, factory_inventory, optimization_summary,
                       delay_updates, solution_schedule, optimization_versions, projects
         CASCADE",
    )
    .execute(pool)
    .await
    .unwrap();
}

/// Build one schedule row for `module_id` at position `index`. Times are
/// derived from the index so rows are distinct but deterministic.
pub fn schedule_row(module_id: &str, index: i32) -> ScheduleRow {
    let base = index as i64 * 10;
    ScheduleRow {
        module_id: module_id.to_string(),
        module_index: index,
        production_start: base,
        production_duration: 8,
        transport_start: base + 8,
        transport_duration: 2,
        arrival_time: base + 10,
        installation_start: base + 12,
        installation_duration: 4,
        earliest_production_start: base,
        earliest_transport_start: base + 8,
        earliest_installation_start: base + 10,
    }
}

/// Build `n` schedule rows named M1..Mn.
pub fn schedule_rows(n: i32) -> Vec<ScheduleRow> {
    (0..n)
        .map(|i| schedule_row(&format!("M{}", i + 1), i))
        .collect()
}

/// Build a delay observation with no reason text.
pub fn delay(module_id: &str, kind: DelayKind, phase: DelayPhase, hours: f64) -> NewDelay {
    NewDelay {
        module_id: module_id.to_string(),
        kind,
        phase,
        delay_hours: hours,
        detected_at_slot: 24,
        detected_at: chrono::Utc::now(),
        reason: None,
    }
}

/// Build a run summary with the given objective value.
pub fn run_summary(objective: f64) -> RunSummary {
    RunSummary {
        objective_value: objective,
        status: "Optimal".to_string(),
        project_finish_time: 120,
        num_orders: 3,
        order_times: vec![0, 40, 80],
    }
}
