//! # Schedule Types — Result Rows, Version Tags, Delay Observations
//!
//! Defines the domain types that flow into the store layer: the
//! [`ResultVersion`] tag that decides replace-vs-append semantics, the
//! [`ScheduleRow`] payload produced by the optimizer for each module, and
//! the delay/summary/inventory payloads recorded alongside a run.
//!
//! The "current" result set is the one written without a version: those rows
//! are replaced wholesale on the next unversioned write. Rows written under a
//! minted version are never touched again.

use serde::{Deserialize, Serialize};

/// Version tag for a result write.
///
/// `Unversioned` selects replace semantics (the current result set is
/// discarded and rewritten); `Versioned` selects append semantics (rows are
/// added under that version and preserved forever). Stored as a nullable
/// `version_id` column; NULL exists only at the SQL boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultVersion {
    Unversioned,
    Versioned(i64),
}

impl ResultVersion {
    /// Nullable column value for binding into queries.
    pub fn as_sql(&self) -> Option<i64> {
        match self {
            ResultVersion::Unversioned => None,
            ResultVersion::Versioned(id) => Some(*id),
        }
    }

    pub fn from_sql(version_id: Option<i64>) -> Self {
        match version_id {
            None => ResultVersion::Unversioned,
            Some(id) => ResultVersion::Versioned(id),
        }
    }

    pub fn is_versioned(&self) -> bool {
        matches!(self, ResultVersion::Versioned(_))
    }
}

impl std::fmt::Display for ResultVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultVersion::Unversioned => write!(f, "current"),
            ResultVersion::Versioned(id) => write!(f, "v{}", id),
        }
    }
}

/// One module's schedule as produced by the optimizer.
///
/// All times are integer slots on the planning horizon. Finish and wait
/// times are derived, not stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub module_id: String,
    pub module_index: i32,
    pub production_start: i64,
    pub production_duration: i64,
    pub transport_start: i64,
    pub transport_duration: i64,
    pub arrival_time: i64,
    pub installation_start: i64,
    pub installation_duration: i64,
    /// Lower bounds carried through re-optimization: a rescheduled run may
    /// not move these activities earlier than the cutoff allows.
    pub earliest_production_start: i64,
    pub earliest_transport_start: i64,
    pub earliest_installation_start: i64,
}

impl ScheduleRow {
    pub fn production_finish(&self) -> i64 {
        self.production_start + self.production_duration
    }

    pub fn transport_finish(&self) -> i64 {
        self.transport_start + self.transport_duration
    }

    pub fn installation_finish(&self) -> i64 {
        self.installation_start + self.installation_duration
    }

    /// Slots the finished module sits in the factory before transport.
    pub fn factory_wait(&self) -> i64 {
        self.transport_start - self.production_finish()
    }

    /// Slots the module sits on site between arrival and installation.
    pub fn site_wait(&self) -> i64 {
        self.installation_start - self.arrival_time
    }
}

/// How a delay manifests on the affected activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayKind {
    /// The activity takes longer than planned.
    DurationExtension,
    /// The activity cannot start until later than planned.
    StartPostponement,
}

impl DelayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DelayKind::DurationExtension => "duration_extension",
            DelayKind::StartPostponement => "start_postponement",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "duration_extension" => Some(DelayKind::DurationExtension),
            "start_postponement" => Some(DelayKind::StartPostponement),
            _ => None,
        }
    }
}

/// Which leg of the module's journey the delay hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayPhase {
    Fabrication,
    Transport,
    Installation,
}

impl DelayPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DelayPhase::Fabrication => "fabrication",
            DelayPhase::Transport => "transport",
            DelayPhase::Installation => "installation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fabrication" => Some(DelayPhase::Fabrication),
            "transport" => Some(DelayPhase::Transport),
            "installation" => Some(DelayPhase::Installation),
            _ => None,
        }
    }
}

/// A delay observation to record. Delays start out pending and are stamped
/// with a version id once a re-optimization consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDelay {
    pub module_id: String,
    pub kind: DelayKind,
    pub phase: DelayPhase,
    pub delay_hours: f64,
    /// Slot on the planning horizon at which the delay was observed.
    pub detected_at_slot: i64,
    pub detected_at: chrono::DateTime<chrono::Utc>,
    pub reason: Option<String>,
}

/// Aggregate metrics for one solver run, rewritten per version on each save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub objective_value: f64,
    pub status: String,
    pub project_finish_time: i64,
    pub num_orders: i32,
    pub order_times: Vec<i64>,
}

/// One cell of an inventory time series (factory or site).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryLevel {
    pub time_slot: i64,
    pub module_id: String,
    pub quantity: i32,
}
