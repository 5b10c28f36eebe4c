//! `task` subcommands.

use super::parse_datetime;
use crate::filters::{SortOrder, TaskFilter, TaskSort, TaskSortField};
use crate::types::{
    Assignee, AssigneeKind, NewTask, Priority, ScheduleStatus, TaskStatus, TaskUpdate,
};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

pub fn parse_task_status(s: &str) -> Result<TaskStatus, String> {
    TaskStatus::from_str(s)
        .ok_or_else(|| format!("Invalid status '{}'. Valid: todo, in-progress, completed", s))
}

pub fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::from_str(s).ok_or_else(|| format!("Invalid priority '{}'. Valid: low, medium, high", s))
}

pub fn parse_schedule_status(s: &str) -> Result<ScheduleStatus, String> {
    ScheduleStatus::from_str(s).ok_or_else(|| {
        format!(
            "Invalid schedule status '{}'. Valid: unscheduled, scheduled, partially_scheduled",
            s
        )
    })
}

pub fn parse_assignee_kind(s: &str) -> Result<AssigneeKind, String> {
    AssigneeKind::from_str(s)
        .ok_or_else(|| format!("Invalid assignee type '{}'. Valid: user, team, contact", s))
}

fn parse_sort_field(s: &str) -> Result<TaskSortField, String> {
    match s {
        "due" | "due_date" => Ok(TaskSortField::DueDate),
        "priority" => Ok(TaskSortField::Priority),
        "created" | "created_at" => Ok(TaskSortField::CreatedAt),
        "title" => Ok(TaskSortField::Title),
        _ => Err(format!(
            "Invalid sort field '{}'. Valid: due_date, priority, created_at, title",
            s
        )),
    }
}

/// Raw assignee pair as submitted by a form. Validation happens in the
/// service, so a half-filled pair reaches it and is rejected there.
#[derive(Args, Debug, Clone, Default)]
pub struct AssigneeArgs {
    /// Id of the user or team responsible
    #[arg(long)]
    pub assigned_to: Option<String>,

    /// Kind of assignee: user or team
    #[arg(long, value_parser = parse_assignee_kind)]
    pub assigned_to_type: Option<AssigneeKind>,
}

impl AssigneeArgs {
    /// Both halves, for filtering. A lone half filters nothing.
    pub fn pair(&self) -> Option<Assignee> {
        match (&self.assigned_to, self.assigned_to_type) {
            (Some(id), Some(kind)) => Some(Assignee::from_parts(kind, id.clone())),
            _ => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Create a task
    Create(TaskCreateArgs),

    /// Update fields of a task
    Update(TaskUpdateArgs),

    /// Show a task, optionally with its linked events
    Show {
        id: String,

        /// Include linked events
        #[arg(long)]
        events: bool,
    },

    /// List tasks
    List(TaskListArgs),

    /// Re-derive a task's schedule status from its linked events, or mark
    /// it partially scheduled. Scheduled and unscheduled are always derived.
    ScheduleStatus {
        id: String,

        /// Mark the task partially_scheduled until its relations next change
        #[arg(long)]
        partial: bool,
    },

    /// Delete a task and its relations. Linked events are kept.
    Delete { id: String },
}

#[derive(Args, Debug)]
pub struct TaskCreateArgs {
    pub title: String,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, value_parser = parse_task_status)]
    pub status: Option<TaskStatus>,

    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<Priority>,

    /// Due date (RFC 3339 or YYYY-MM-DD[THH:MM])
    #[arg(long, value_parser = parse_datetime)]
    pub due: Option<DateTime<Utc>>,

    #[command(flatten)]
    pub assignee: AssigneeArgs,
}

impl From<TaskCreateArgs> for NewTask {
    fn from(args: TaskCreateArgs) -> Self {
        NewTask {
            title: args.title,
            description: args.description,
            status: args.status,
            priority: args.priority,
            due_date: args.due,
            assigned_to: args.assignee.assigned_to,
            assigned_to_type: args.assignee.assigned_to_type,
            department: None,
        }
    }
}

#[derive(Args, Debug)]
pub struct TaskUpdateArgs {
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, value_parser = parse_task_status)]
    pub status: Option<TaskStatus>,

    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<Priority>,

    #[arg(long, value_parser = parse_datetime)]
    pub due: Option<DateTime<Utc>>,

    #[command(flatten)]
    pub assignee: AssigneeArgs,
}

impl TaskUpdateArgs {
    pub fn into_update(self) -> (String, TaskUpdate) {
        let update = TaskUpdate {
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            due_date: self.due,
            assigned_to: self.assignee.assigned_to,
            assigned_to_type: self.assignee.assigned_to_type,
            department: None,
        };
        (self.id, update)
    }
}

#[derive(Args, Debug)]
pub struct TaskListArgs {
    #[arg(long, value_parser = parse_task_status)]
    pub status: Option<TaskStatus>,

    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<Priority>,

    #[arg(long, value_parser = parse_schedule_status)]
    pub schedule_status: Option<ScheduleStatus>,

    /// Only tasks in this department
    #[arg(long)]
    pub filter_department: Option<String>,

    #[command(flatten)]
    pub assignee: AssigneeArgs,

    /// Only tasks due before this instant
    #[arg(long, value_parser = parse_datetime)]
    pub due_before: Option<DateTime<Utc>>,

    /// Case-insensitive text search over title and description
    #[arg(short, long)]
    pub search: Option<String>,

    /// Sort key: due_date (default), priority, created_at, title
    #[arg(long, value_parser = parse_sort_field, default_value = "due_date")]
    pub sort: TaskSortField,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

impl From<TaskListArgs> for TaskFilter {
    fn from(args: TaskListArgs) -> Self {
        TaskFilter {
            status: args.status,
            priority: args.priority,
            schedule_status: args.schedule_status,
            department: args.filter_department,
            assigned_to: args.assignee.pair(),
            due_before: args.due_before,
            search: args.search,
            sort: TaskSort {
                field: args.sort,
                order: if args.desc {
                    SortOrder::Desc
                } else {
                    SortOrder::Asc
                },
            },
        }
    }
}
