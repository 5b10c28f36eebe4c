//! Filtering and sorting pipelines for task and event list views.

use crate::recurrence::occurs_within;
use crate::types::{Assignee, CalendarEvent, Priority, ScheduleStatus, Task, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSortField {
    #[default]
    DueDate,
    Priority,
    CreatedAt,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskSort {
    pub field: TaskSortField,
    pub order: SortOrder,
}

/// Criteria for the task list view. Unset fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub schedule_status: Option<ScheduleStatus>,
    pub department: Option<String>,
    pub assigned_to: Option<Assignee>,
    /// Only tasks due strictly before this instant.
    pub due_before: Option<DateTime<Utc>>,
    /// Case-insensitive substring over title and description.
    pub search: Option<String>,
    #[serde(default)]
    pub sort: TaskSort,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if self.status.is_some_and(|s| s != task.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }
        if self.schedule_status.is_some_and(|s| s != task.schedule_status) {
            return false;
        }
        if let Some(ref dept) = self.department
            && task.department.as_deref() != Some(dept.as_str())
        {
            return false;
        }
        if let Some(ref who) = self.assigned_to
            && task.assigned_to.as_ref() != Some(who)
        {
            return false;
        }
        if let Some(before) = self.due_before {
            match task.due_date {
                Some(due) if due < before => {}
                _ => return false,
            }
        }
        if let Some(ref needle) = self.search {
            let needle = needle.to_lowercase();
            let in_title = task.title.to_lowercase().contains(&needle);
            let in_desc = task
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_title && !in_desc {
                return false;
            }
        }
        true
    }

    /// Filter then sort. Tasks without a due date sort last in either order.
    pub fn apply(&self, tasks: Vec<Task>) -> Vec<Task> {
        let mut out: Vec<Task> = tasks.into_iter().filter(|t| self.matches(t)).collect();
        let order = self.sort.order;
        out.sort_by(|a, b| {
            let cmp = match self.sort.field {
                TaskSortField::DueDate => {
                    return match (a.due_date, b.due_date) {
                        (Some(x), Some(y)) => directed(x.cmp(&y), order),
                        (Some(_), None) => Ordering::Less,
                        (None, Some(_)) => Ordering::Greater,
                        (None, None) => a.created_at.cmp(&b.created_at),
                    };
                }
                TaskSortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
                TaskSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                TaskSortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            };
            directed(cmp, order)
        });
        out
    }
}

fn directed(cmp: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => cmp,
        SortOrder::Desc => cmp.reverse(),
    }
}

/// Criteria for the calendar view. Results are sorted by start time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilter {
    /// Window start; events ending at or before it are excluded.
    pub from: Option<DateTime<Utc>>,
    /// Window end; events starting at or after it are excluded.
    pub to: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub department: Option<String>,
    pub user_id: Option<String>,
    pub assigned_to: Option<Assignee>,
}

impl EventFilter {
    pub fn matches(&self, event: &CalendarEvent) -> bool {
        if let Some(ref category) = self.category
            && !event.category.eq_ignore_ascii_case(category)
        {
            return false;
        }
        if let Some(ref dept) = self.department
            && event.department.as_deref() != Some(dept.as_str())
        {
            return false;
        }
        if let Some(ref user) = self.user_id
            && &event.user_id != user
        {
            return false;
        }
        if let Some(ref who) = self.assigned_to
            && event.assigned_to.as_ref() != Some(who)
        {
            return false;
        }
        if self.from.is_some() || self.to.is_some() {
            let from = self.from.unwrap_or(DateTime::<Utc>::MIN_UTC);
            let to = self.to.unwrap_or(DateTime::<Utc>::MAX_UTC);
            if !occurs_within(event, from, to) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
        let mut out: Vec<CalendarEvent> =
            events.into_iter().filter(|e| self.matches(e)).collect();
        out.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        out
    }
}
