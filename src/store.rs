//! Storage seam for the scheduling service.
//!
//! The service never reaches for an ambient connection; it is handed a
//! `Store` at construction. [`crate::db::Database`] is the SQLite-backed
//! implementation.

use crate::error::{CrmError, Result};
use crate::types::{
    AssignableKind, Assignee, Assignment, CalendarEvent, DisplayEntity, Relation, ScheduleStatus,
    Task,
};
use chrono::{DateTime, Utc};

/// Row filter for the relation table. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationFilter {
    pub id: Option<String>,
    pub task_id: Option<String>,
    pub event_id: Option<String>,
    pub relation_type: Option<String>,
}

impl RelationFilter {
    pub fn by_id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    pub fn for_task(task_id: &str) -> Self {
        Self {
            task_id: Some(task_id.to_string()),
            ..Default::default()
        }
    }

    pub fn for_event(event_id: &str) -> Self {
        Self {
            event_id: Some(event_id.to_string()),
            ..Default::default()
        }
    }

    pub fn for_pair(task_id: &str, event_id: &str) -> Self {
        Self {
            task_id: Some(task_id.to_string()),
            event_id: Some(event_id.to_string()),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, relation_type: &str) -> Self {
        self.relation_type = Some(relation_type.to_string());
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.id.is_none()
            && self.task_id.is_none()
            && self.event_id.is_none()
            && self.relation_type.is_none()
    }

    /// Refuse filters that would touch every row of a destructive query.
    pub fn require_bounded(&self) -> Result<()> {
        if self.is_unbounded() {
            return Err(CrmError::invalid(
                "filter",
                "refusing to delete relations without a filter",
            ));
        }
        Ok(())
    }
}

/// Typed CRUD over the CRM's scheduling tables.
///
/// Every call is one unit of work; multi-step consistency is the caller's
/// job. Uniqueness violations must surface as [`CrmError::Conflict`].
pub trait Store {
    fn insert_task(&self, task: &Task) -> Result<()>;
    fn get_task(&self, id: &str) -> Result<Option<Task>>;
    /// Replace every mutable column of an existing task.
    fn update_task(&self, task: &Task) -> Result<()>;
    fn set_schedule_status(
        &self,
        id: &str,
        status: ScheduleStatus,
        at: DateTime<Utc>,
    ) -> Result<()>;
    /// Returns whether a row was removed.
    fn delete_task(&self, id: &str) -> Result<bool>;
    fn list_tasks(&self, department: Option<&str>) -> Result<Vec<Task>>;

    fn insert_event(&self, event: &CalendarEvent) -> Result<()>;
    fn get_event(&self, id: &str) -> Result<Option<CalendarEvent>>;
    fn update_event(&self, event: &CalendarEvent) -> Result<()>;
    fn delete_event(&self, id: &str) -> Result<bool>;
    fn list_events(&self, department: Option<&str>) -> Result<Vec<CalendarEvent>>;

    fn insert_relation(&self, relation: &Relation) -> Result<()>;
    /// Matching relations in creation order.
    fn find_relations(&self, filter: &RelationFilter) -> Result<Vec<Relation>>;
    /// Returns the number of rows removed.
    fn delete_relations(&self, filter: &RelationFilter) -> Result<usize>;

    fn get_assignment(&self, assignable_id: &str, kind: AssignableKind)
    -> Result<Option<Assignment>>;
    fn insert_assignment(&self, assignment: &Assignment) -> Result<()>;
    fn delete_assignment(&self, assignable_id: &str, kind: AssignableKind) -> Result<bool>;

    fn get_display_entity(&self, target: &Assignee) -> Result<Option<DisplayEntity>>;
}
