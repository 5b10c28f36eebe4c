//! CLI command definitions for crm-schedule.
//!
//! `Cli` is the entry point; each command group keeps its argument structs
//! in its own module.

pub mod directory;
pub mod event;
pub mod relation;
pub mod task;

use crate::format::OutputFormat;
use crate::types::Session;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use directory::DirectoryCommand;
use event::EventCommand;
use relation::{AssignArgs, LinkArgs, RelationsArgs, UnlinkArgs};
use task::TaskCommand;

/// Task and calendar-event scheduling for the CRM
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Acting user id, stamped on created records
    #[arg(short, long, default_value = "cli", global = true)]
    pub user: String,

    /// Acting user's department
    #[arg(long, global = true)]
    pub department: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn session(&self) -> Session {
        let session = Session::new(self.user.clone());
        match self.department {
            Some(ref dept) => session.with_department(dept.clone()),
            None => session,
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create, inspect and list tasks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Create, update, inspect and delete calendar events
    #[command(subcommand)]
    Event(EventCommand),

    /// Link an existing task to an existing event
    Link(LinkArgs),

    /// Remove every relation between a task and an event
    Unlink(UnlinkArgs),

    /// List the relations of a task or an event
    Relations(RelationsArgs),

    /// List the configured relation types
    RelationTypes,

    /// Assign a task, event or activity to a user, team or contact
    Assign(AssignArgs),

    /// Re-derive schedule status for every task and prune orphaned relations
    Reconcile,

    /// Manage users, teams and contacts
    #[command(subcommand)]
    Directory(DirectoryCommand),
}

/// Parse a timestamp argument.
///
/// Accepts RFC 3339 (`2024-01-10T09:00:00Z`), a naive date-time read as UTC
/// (`2024-01-10T09:00`, `2024-01-10 09:00`), or a bare date at midnight UTC.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Ok(at.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        && let Some(naive) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(naive.and_utc());
    }
    Err(format!(
        "Invalid timestamp '{}'. Use RFC 3339, 'YYYY-MM-DDTHH:MM' or 'YYYY-MM-DD'",
        s
    ))
}
