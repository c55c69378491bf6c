//! # Persistence Policy — Replace vs Append
//!
//! The invoking application decides, per solver run, which of three modes
//! applies; this module executes the chosen mode end to end. The first two
//! modes rewrite the current (replaceable) result set. Only a
//! re-optimization driven by observed delays mints a version and appends,
//! which is what makes the run survive every later write.

use tracing::info;

use crate::db::Database;
use crate::error::StoreResult;
use crate::schedule::{ResultVersion, ScheduleRow};

/// How one solver run should be persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    /// First computation for the project: write the current set.
    FirstRun,
    /// Recomputation without delay information: rewrite the current set.
    /// The prior current set is discarded; versioned history is untouched.
    Recompute,
    /// Re-optimization driven by delays: mint a version, then append under
    /// it, preserving all earlier results.
    Reoptimize {
        /// Version this run diverges from; `None` when re-optimizing the
        /// current set.
        base_version_id: Option<i64>,
        /// Cutoff after which the new schedule differs from its base.
        reoptimize_from: chrono::DateTime<chrono::Utc>,
        /// Delay observations that motivated the run.
        delay_ids: Vec<i64>,
    },
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::FirstRun => "first_run",
            RunMode::Recompute => "recompute",
            RunMode::Reoptimize { .. } => "reoptimize",
        }
    }
}

/// Persist one solver run and return the version tag its rows were written
/// under.
///
/// `FirstRun` and `Recompute` produce [`ResultVersion::Unversioned`];
/// `Reoptimize` mints the version and returns it so the caller can attach
/// summaries or later rewrites to it.
pub async fn persist_run(
    db: &Database,
    project_id: i64,
    mode: RunMode,
    rows: &[ScheduleRow],
) -> StoreResult<ResultVersion> {
    let version = match &mode {
        RunMode::FirstRun | RunMode::Recompute => ResultVersion::Unversioned,
        RunMode::Reoptimize {
            base_version_id,
            reoptimize_from,
            delay_ids,
        } => {
            let record = db
                .create_version(project_id, *base_version_id, *reoptimize_from, delay_ids)
                .await?;
            info!(
                project_id,
                version_id = record.version_id,
                version_number = record.version_number,
                delays = delay_ids.len(),
                "Version minted"
            );
            ResultVersion::Versioned(record.version_id)
        }
    };

    db.write_results(project_id, rows, version).await?;
    info!(
        project_id,
        mode = mode.as_str(),
        version = %version,
        rows = rows.len(),
        "Results persisted"
    );
    Ok(version)
}
