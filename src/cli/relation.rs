//! `link`, `unlink`, `relations` and `assign` commands.

use super::task::parse_assignee_kind;
use crate::types::{AssignableKind, AssigneeKind};
use clap::Args;

fn parse_assignable_kind(s: &str) -> Result<AssignableKind, String> {
    AssignableKind::from_str(s)
        .ok_or_else(|| format!("Invalid entity kind '{}'. Valid: task, event, activity", s))
}

#[derive(Args, Debug)]
pub struct LinkArgs {
    pub task_id: String,
    pub event_id: String,

    /// Relation type (defaults to the configured default; see `relation-types`)
    #[arg(long)]
    pub relation_type: Option<String>,
}

#[derive(Args, Debug)]
pub struct UnlinkArgs {
    pub task_id: String,
    pub event_id: String,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct RelationsArgs {
    /// Relations of this task
    #[arg(long)]
    pub task: Option<String>,

    /// Relations of this event
    #[arg(long)]
    pub event: Option<String>,
}

#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Kind of entity being assigned: task, event or activity
    #[arg(value_parser = parse_assignable_kind)]
    pub kind: AssignableKind,

    /// Id of the entity being assigned
    pub id: String,

    /// Kind of assignee: user, team or contact (activities only)
    #[arg(value_parser = parse_assignee_kind, required_unless_present = "clear")]
    pub target_type: Option<AssigneeKind>,

    /// Id of the assignee
    #[arg(required_unless_present = "clear")]
    pub target_id: Option<String>,

    /// Remove the current assignment instead
    #[arg(long, conflicts_with_all = ["target_type", "target_id"])]
    pub clear: bool,
}
