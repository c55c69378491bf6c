//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim. Contains the
//! execution logic for each subcommand: schema setup, project management,
//! version history, the delay log, and stored-state inspection.

use anyhow::Result;
use replan::db;
use replan::schedule::ResultVersion;

use super::{Cli, ProjectAction};

// ── Schema ──────────────────────────────────────────────────────

/// Create the database schema. Safe to run repeatedly.
pub fn run_init(cli: &Cli) -> Result<()> {
    let database_url = cli.database_url.as_deref().ok_or_else(|| {
        anyhow::anyhow!("DATABASE_URL is required (set via --database-url or env)")
    })?;
    let rt = tokio::runtime::Runtime::new()?;
    let database = rt.block_on(db::Database::connect(database_url))?;
    rt.block_on(database.ensure_schema())?;
    eprintln!("Schema ready");
    Ok(())
}

// ── Project Management ──────────────────────────────────────────

/// Handle the `project` subcommand and its actions.
pub fn run_project(cli: &Cli, action: &ProjectAction) -> Result<()> {
    let database_url = cli.database_url.as_deref().ok_or_else(|| {
        anyhow::anyhow!("DATABASE_URL is required (set via --database-url or env)")
    })?;
    let rt = tokio::runtime::Runtime::new()?;
    let database = rt.block_on(db::Database::connect(database_url))?;

    match action {
        ProjectAction::Create { name } => {
            let project = rt.block_on(database.create_project(name))?;
            eprintln!(
                "Project '{}' created (id={})",
                project.name, project.project_id
            );
        }
        ProjectAction::List => {
            let projects = rt.block_on(database.list_projects())?;
            if projects.is_empty() {
                eprintln!("No projects found");
                return Ok(());
            }
            eprintln!("{:<8} {:<30} {:<17}", "ID", "NAME", "CREATED");
            eprintln!("{}", "-".repeat(56));
            for p in &projects {
                eprintln!(
                    "{:<8} {:<30} {:<17}",
                    p.project_id,
                    p.name,
                    p.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        ProjectAction::Show { project_id } => {
            let proj = rt
                .block_on(database.get_project(*project_id))?
                .ok_or_else(|| anyhow::anyhow!("Project {} not found", project_id))?;
            let versions = rt.block_on(database.list_versions(proj.project_id))?;
            let pending = rt.block_on(database.pending_delays(proj.project_id))?;

            eprintln!("Project: {} (id={})", proj.name, proj.project_id);
            eprintln!(
                "  Created:        {}",
                proj.created_at.format("%Y-%m-%d %H:%M")
            );
            eprintln!("  Versions:       {}", versions.len());
            if let Some(latest) = versions.last() {
                eprintln!(
                    "  Latest version: v{} (number {}, created {})",
                    latest.version_id,
                    latest.version_number,
                    latest.created_at.format("%Y-%m-%d %H:%M")
                );
            }
            eprintln!("  Pending delays: {}", pending.len());
        }
        ProjectAction::Delete { project_id, force } => {
            let proj = rt
                .block_on(database.get_project(*project_id))?
                .ok_or_else(|| anyhow::anyhow!("Project {} not found", project_id))?;
            if !*force {
                anyhow::bail!(
                    "Refusing to delete project '{}' without --force (drops its schedule, versions, and delay log)",
                    proj.name
                );
            }
            rt.block_on(database.delete_project(proj.project_id))?;
            eprintln!("Project '{}' deleted", proj.name);
        }
    }

    Ok(())
}

// ── Version History ─────────────────────────────────────────────

/// Print a project's re-optimization history.
pub fn run_versions(cli: &Cli, project_id: i64) -> Result<()> {
    let database_url = cli.database_url.as_deref().ok_or_else(|| {
        anyhow::anyhow!("DATABASE_URL is required (set via --database-url or env)")
    })?;
    let rt = tokio::runtime::Runtime::new()?;
    let database = rt.block_on(db::Database::connect(database_url))?;

    let proj = rt
        .block_on(database.get_project(project_id))?
        .ok_or_else(|| anyhow::anyhow!("Project {} not found", project_id))?;
    let versions = rt.block_on(database.list_versions(project_id))?;
    if versions.is_empty() {
        eprintln!(
            "No versions recorded for '{}' (only unversioned results)",
            proj.name
        );
        return Ok(());
    }

    eprintln!(
        "{:<8} {:<8} {:<8} {:<17} {:<8} {:<17}",
        "NUMBER", "ID", "BASE", "REOPT FROM", "DELAYS", "CREATED"
    );
    eprintln!("{}", "-".repeat(71));
    for v in &versions {
        let base = v
            .base_version_id
            .map(|b| format!("v{}", b))
            .unwrap_or_else(|| "-".to_string());
        eprintln!(
            "{:<8} {:<8} {:<8} {:<17} {:<8} {:<17}",
            v.version_number,
            v.version_id,
            base,
            v.reoptimize_from.format("%Y-%m-%d %H:%M"),
            v.delay_ids.len(),
            v.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

// ── Delay Log ───────────────────────────────────────────────────

/// Print a project's delay log, optionally only the rows not yet
/// consumed by a version.
pub fn run_delays(cli: &Cli, project_id: i64, pending: bool) -> Result<()> {
    let database_url = cli.database_url.as_deref().ok_or_else(|| {
        anyhow::anyhow!("DATABASE_URL is required (set via --database-url or env)")
    })?;
    let rt = tokio::runtime::Runtime::new()?;
    let database = rt.block_on(db::Database::connect(database_url))?;

    let proj = rt
        .block_on(database.get_project(project_id))?
        .ok_or_else(|| anyhow::anyhow!("Project {} not found", project_id))?;
    let delays = if pending {
        rt.block_on(database.pending_delays(project_id))?
    } else {
        rt.block_on(database.list_delays(project_id))?
    };
    if delays.is_empty() {
        if pending {
            eprintln!("No pending delays for '{}'", proj.name);
        } else {
            eprintln!("No delays recorded for '{}'", proj.name);
        }
        return Ok(());
    }

    eprintln!(
        "{:<6} {:<14} {:<20} {:<14} {:<7} {:<7} {:<9} {:<17} Reason",
        "ID", "MODULE", "KIND", "PHASE", "HOURS", "SLOT", "VERSION", "DETECTED"
    );
    eprintln!("{}", "-".repeat(108));
    for d in &delays {
        let version = d
            .version_id
            .map(|v| format!("v{}", v))
            .unwrap_or_else(|| "pending".to_string());
        eprintln!(
            "{:<6} {:<14} {:<20} {:<14} {:<7} {:<7} {:<9} {:<17} {}",
            d.delay_id,
            d.module_id,
            d.kind,
            d.phase,
            d.delay_hours,
            d.detected_at_slot,
            version,
            d.detected_at.format("%Y-%m-%d %H:%M"),
            d.reason.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

// ── Inspection ──────────────────────────────────────────────────

/// Summarize everything stored for a project: per-table counts, result-row
/// distribution across versions, and the current run summary if present.
pub fn run_inspect(cli: &Cli, project_id: i64) -> Result<()> {
    let database_url = cli.database_url.as_deref().ok_or_else(|| {
        anyhow::anyhow!("DATABASE_URL is required (set via --database-url or env)")
    })?;
    let rt = tokio::runtime::Runtime::new()?;
    let database = rt.block_on(db::Database::connect(database_url))?;

    let proj = rt
        .block_on(database.get_project(project_id))?
        .ok_or_else(|| anyhow::anyhow!("Project {} not found", project_id))?;
    let totals = rt.block_on(database.project_totals(project_id))?;
    let distribution = rt.block_on(database.version_distribution(project_id))?;

    eprintln!("Project: {} (id={})", proj.name, proj.project_id);
    eprintln!(
        "  Created:        {}",
        proj.created_at.format("%Y-%m-%d %H:%M")
    );
    eprintln!("  Schedule rows:  {}", totals.schedule_rows);
    eprintln!("  Versions:       {}", totals.versions);
    eprintln!(
        "  Delays:         {} ({} pending)",
        totals.delays, totals.pending_delays
    );
    eprintln!("  Summaries:      {}", totals.summaries);
    eprintln!(
        "  Inventory rows: factory={}, site={}",
        totals.factory_rows, totals.site_rows
    );

    if !distribution.is_empty() {
        eprintln!("\nResult rows by version:");
        eprintln!("{:<10} ROWS", "VERSION");
        eprintln!("{}", "-".repeat(18));
        for vc in &distribution {
            let label = vc
                .version_id
                .map(|v| format!("v{}", v))
                .unwrap_or_else(|| "current".to_string());
            eprintln!("{:<10} {}", label, vc.count);
        }
    }

    if let Some(summary) =
        rt.block_on(database.get_summary(project_id, ResultVersion::Unversioned))?
    {
        eprintln!("\nCurrent summary:");
        eprintln!("  Objective:   {:.2}", summary.objective_value);
        eprintln!("  Status:      {}", summary.status);
        eprintln!("  Finish time: {}", summary.project_finish_time);
        eprintln!("  Orders:      {}", summary.num_orders);
    }

    Ok(())
}
