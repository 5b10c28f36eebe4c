//! Core types for task and calendar-event scheduling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(TaskStatus::Todo),
            "in-progress" | "in_progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    /// Numeric rank used for sorting (higher = more important).
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        }
    }
}

/// Cached projection of whether calendar time has been allocated to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    #[default]
    Unscheduled,
    Scheduled,
    /// Only reachable through an explicit caller action.
    PartiallyScheduled,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Unscheduled => "unscheduled",
            ScheduleStatus::Scheduled => "scheduled",
            ScheduleStatus::PartiallyScheduled => "partially_scheduled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "unscheduled" => Some(ScheduleStatus::Unscheduled),
            "scheduled" => Some(ScheduleStatus::Scheduled),
            "partially_scheduled" => Some(ScheduleStatus::PartiallyScheduled),
            _ => None,
        }
    }
}

/// Discriminator for the entity an assignment points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssigneeKind {
    User,
    Team,
    Contact,
}

impl AssigneeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssigneeKind::User => "user",
            AssigneeKind::Team => "team",
            AssigneeKind::Contact => "contact",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(AssigneeKind::User),
            "team" => Some(AssigneeKind::Team),
            "contact" => Some(AssigneeKind::Contact),
            _ => None,
        }
    }
}

/// The responsible party of a task, event or activity.
///
/// Tasks and calendar events accept `User` and `Team` only; `Contact` is
/// reserved for activity assignments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Assignee {
    User(String),
    Team(String),
    Contact(String),
}

impl Assignee {
    pub fn from_parts(kind: AssigneeKind, id: impl Into<String>) -> Self {
        let id = id.into();
        match kind {
            AssigneeKind::User => Assignee::User(id),
            AssigneeKind::Team => Assignee::Team(id),
            AssigneeKind::Contact => Assignee::Contact(id),
        }
    }

    pub fn kind(&self) -> AssigneeKind {
        match self {
            Assignee::User(_) => AssigneeKind::User,
            Assignee::Team(_) => AssigneeKind::Team,
            Assignee::Contact(_) => AssigneeKind::Contact,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Assignee::User(id) | Assignee::Team(id) | Assignee::Contact(id) => id,
        }
    }
}

/// Kind of entity that can carry an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignableKind {
    CalendarEvent,
    Task,
    Activity,
}

impl AssignableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignableKind::CalendarEvent => "calendar_event",
            AssignableKind::Task => "task",
            AssignableKind::Activity => "activity",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "calendar_event" | "event" => Some(AssignableKind::CalendarEvent),
            "task" => Some(AssignableKind::Task),
            "activity" => Some(AssignableKind::Activity),
            _ => None,
        }
    }

    /// Whether the given assignee kind may be attached to this entity.
    pub fn accepts(&self, kind: AssigneeKind) -> bool {
        match self {
            AssignableKind::Activity => true,
            AssignableKind::CalendarEvent | AssignableKind::Task => {
                matches!(kind, AssigneeKind::User | AssigneeKind::Team)
            }
        }
    }
}

/// Recurrence frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

/// Recurrence rule attached to a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: Frequency,
    /// Repeat every `interval` periods. Must be at least 1.
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Last moment an occurrence may start (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
    /// Dates whose occurrence is skipped. Matched by calendar day.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<DateTime<Utc>>,
}

fn default_interval() -> u32 {
    1
}

/// A task in the CRM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Assignee>,
    pub department: Option<String>,
    pub schedule_status: ScheduleStatus,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A calendar event. `end` is always after `start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub category: String,
    pub recurrence: Option<Recurrence>,
    pub assigned_to: Option<Assignee>,
    pub department: Option<String>,
    /// Owner/creator of the event.
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A typed link between one task and one calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub id: String,
    pub task_id: String,
    pub event_id: String,
    pub relation_type: String,
    pub created_at: DateTime<Utc>,
}

/// A polymorphic assignment row. One per (assignable_id, assignable_type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub assignable_id: String,
    pub assignable_type: AssignableKind,
    pub target: Assignee,
    pub created_at: DateTime<Utc>,
}

/// Display-ready view of a user, team or contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayEntity {
    pub id: String,
    pub kind: AssigneeKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A CRM user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An external contact. Only activities may be assigned to one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An assignment resolved against the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAssignment {
    pub assignable_id: String,
    pub assignable_type: AssignableKind,
    pub target: Assignee,
    /// `None` when the referenced user/team/contact no longer exists.
    pub display: Option<DisplayEntity>,
}

/// A task hydrated with every live event linked to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskWithEvents {
    pub task: Task,
    pub events: Vec<CalendarEvent>,
}

/// An event with the task it was created for, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventWithTask {
    pub event: CalendarEvent,
    pub task: Option<Task>,
}

/// An event with its task and resolved assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetail {
    pub event: CalendarEvent,
    pub task: Option<Task>,
    pub assignment: Option<ResolvedAssignment>,
}

/// One concrete occurrence of a (possibly recurring) event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The acting identity for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub department: Option<String>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            department: None,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }
}

/// Input for creating a task. Assignment fields arrive in raw form shape
/// and are validated into an [`Assignee`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    pub assigned_to_type: Option<AssigneeKind>,
    pub department: Option<String>,
}

/// Partial update for a task. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    pub assigned_to_type: Option<AssigneeKind>,
    pub department: Option<String>,
}

/// Input for creating a calendar event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub category: Option<String>,
    pub recurrence: Option<Recurrence>,
    pub assigned_to: Option<String>,
    pub assigned_to_type: Option<AssigneeKind>,
    pub department: Option<String>,
}

impl NewEvent {
    /// Minimal event input with only the required fields set.
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: None,
            start,
            end,
            category: None,
            recurrence: None,
            assigned_to: None,
            assigned_to_type: None,
            department: None,
        }
    }
}

/// Partial update for a calendar event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub recurrence: Option<Recurrence>,
    pub assigned_to: Option<String>,
    pub assigned_to_type: Option<AssigneeKind>,
    pub department: Option<String>,
}

/// Result of a reconciliation sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub examined: usize,
    pub updated: usize,
    /// Tasks left alone because their status was set manually.
    pub skipped_manual: usize,
}
