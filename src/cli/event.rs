//! `event` subcommands.

use super::parse_datetime;
use super::task::AssigneeArgs;
use crate::filters::EventFilter;
use crate::types::{EventUpdate, Frequency, NewEvent, Recurrence};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

fn parse_frequency(s: &str) -> Result<Frequency, String> {
    match s.to_lowercase().as_str() {
        "daily" => Ok(Frequency::Daily),
        "weekly" => Ok(Frequency::Weekly),
        "monthly" => Ok(Frequency::Monthly),
        _ => Err(format!(
            "Invalid frequency '{}'. Valid: daily, weekly, monthly",
            s
        )),
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct RecurrenceArgs {
    /// Repeat the event: daily, weekly or monthly
    #[arg(long, value_parser = parse_frequency)]
    pub repeat: Option<Frequency>,

    /// Repeat every N periods
    #[arg(long, default_value_t = 1)]
    pub interval: u32,

    /// Last moment an occurrence may start
    #[arg(long, value_parser = parse_datetime)]
    pub until: Option<DateTime<Utc>>,

    /// Skip the occurrence on this date (repeatable)
    #[arg(long = "except", value_parser = parse_datetime)]
    pub exceptions: Vec<DateTime<Utc>>,
}

impl RecurrenceArgs {
    pub fn rule(&self) -> Option<Recurrence> {
        self.repeat.map(|frequency| Recurrence {
            frequency,
            interval: self.interval,
            until: self.until,
            exceptions: self.exceptions.clone(),
        })
    }
}

#[derive(Args, Debug)]
pub struct EventCreateArgs {
    pub title: String,

    /// Start time (RFC 3339 or YYYY-MM-DD[THH:MM])
    #[arg(long, value_parser = parse_datetime)]
    pub start: DateTime<Utc>,

    /// End time, after start
    #[arg(long, value_parser = parse_datetime)]
    pub end: DateTime<Utc>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[command(flatten)]
    pub recurrence: RecurrenceArgs,

    #[command(flatten)]
    pub assignee: AssigneeArgs,
}

impl From<EventCreateArgs> for NewEvent {
    fn from(args: EventCreateArgs) -> Self {
        NewEvent {
            recurrence: args.recurrence.rule(),
            title: args.title,
            description: args.description,
            start: args.start,
            end: args.end,
            category: args.category,
            assigned_to: args.assignee.assigned_to,
            assigned_to_type: args.assignee.assigned_to_type,
            department: None,
        }
    }
}

#[derive(Args, Debug)]
pub struct EventUpdateArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, value_parser = parse_datetime)]
    pub start: Option<DateTime<Utc>>,

    #[arg(long, value_parser = parse_datetime)]
    pub end: Option<DateTime<Utc>>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[command(flatten)]
    pub recurrence: RecurrenceArgs,

    #[command(flatten)]
    pub assignee: AssigneeArgs,
}

impl From<EventUpdateArgs> for EventUpdate {
    fn from(args: EventUpdateArgs) -> Self {
        EventUpdate {
            recurrence: args.recurrence.rule(),
            title: args.title,
            description: args.description,
            start: args.start,
            end: args.end,
            category: args.category,
            assigned_to: args.assignee.assigned_to,
            assigned_to_type: args.assignee.assigned_to_type,
            department: None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum EventCommand {
    /// Create a standalone event
    Create(EventCreateArgs),

    /// Create an event and link it to a task
    CreateForTask {
        task_id: String,

        /// Relation type (defaults to the configured default; see `relation-types`)
        #[arg(long)]
        relation_type: Option<String>,

        #[command(flatten)]
        event: EventCreateArgs,
    },

    /// Update an event
    Update {
        id: String,

        #[command(flatten)]
        update: EventUpdateArgs,
    },

    /// Update an event that must be linked to the given task
    UpdateForTask {
        task_id: String,
        event_id: String,

        #[command(flatten)]
        update: EventUpdateArgs,
    },

    /// Show an event with its task and assignee
    Show { id: String },

    /// List events
    List(EventListArgs),

    /// Expand an event's occurrences within a window
    Occurrences {
        id: String,

        #[arg(long, value_parser = parse_datetime)]
        from: DateTime<Utc>,

        #[arg(long, value_parser = parse_datetime)]
        to: DateTime<Utc>,
    },

    /// Delete an event and release its relations
    Delete { id: String },
}

#[derive(Args, Debug)]
pub struct EventListArgs {
    /// Window start
    #[arg(long, value_parser = parse_datetime)]
    pub from: Option<DateTime<Utc>>,

    /// Window end
    #[arg(long, value_parser = parse_datetime)]
    pub to: Option<DateTime<Utc>>,

    #[arg(long)]
    pub category: Option<String>,

    /// Only events in this department
    #[arg(long)]
    pub filter_department: Option<String>,

    /// Only events owned by this user
    #[arg(long)]
    pub owner: Option<String>,

    #[command(flatten)]
    pub assignee: AssigneeArgs,
}

impl From<EventListArgs> for EventFilter {
    fn from(args: EventListArgs) -> Self {
        EventFilter {
            assigned_to: args.assignee.pair(),
            from: args.from,
            to: args.to,
            category: args.category,
            department: args.filter_department,
            user_id: args.owner,
        }
    }
}
