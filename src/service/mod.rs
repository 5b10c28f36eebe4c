//! Scheduling operations over a [`Store`].
//!
//! `ScheduleService` owns its store handle and the relation-type
//! configuration; nothing here reaches for process-wide state. Operations
//! are split across submodules by concern:
//!
//! - `relations`: create, delete and list task/event relations
//! - `resolver`: hydrate tasks with their events and events with their task
//! - `schedule`: persist derived schedule status, manual overrides, sweeps
//! - `assignments`: polymorphic assignment reads and writes
//! - `lifecycle`: multi-step operations with compensating cleanup
//! - `tasks`, `events`: validated CRUD and list views

mod assignments;
mod events;
mod lifecycle;
mod relations;
mod resolver;
mod schedule;
mod tasks;

use crate::config::{Config, RelationsConfig};
use crate::error::{CrmError, Result};
use crate::store::Store;
use crate::types::{CalendarEvent, Session, Task};
use chrono::{DateTime, SubsecRound, Utc};
use tracing::warn;
use uuid::Uuid;

pub struct ScheduleService<S: Store> {
    store: S,
    relations: RelationsConfig,
    department_scoped: bool,
}

impl<S: Store> ScheduleService<S> {
    /// Service with the default relation types and no department scoping.
    pub fn new(store: S) -> Self {
        Self::with_config(store, &Config::default())
    }

    pub fn with_config(store: S, config: &Config) -> Self {
        Self {
            store,
            relations: config.relations.clone(),
            department_scoped: config.schedule.department_scoped,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn relations_config(&self) -> &RelationsConfig {
        &self.relations
    }

    fn require_task(&self, id: &str) -> Result<Task> {
        self.store
            .get_task(id)?
            .ok_or_else(|| CrmError::task_not_found(id))
    }

    fn require_event(&self, id: &str) -> Result<CalendarEvent> {
        self.store
            .get_event(id)?
            .ok_or_else(|| CrmError::event_not_found(id))
    }

    /// Department a list view is restricted to, if scoping is on.
    fn scope<'a>(&self, session: &'a Session) -> Option<&'a str> {
        if self.department_scoped {
            session.department.as_deref()
        } else {
            None
        }
    }

    /// Check a relation type against configuration, falling back to the
    /// configured default.
    fn relation_type(&self, requested: Option<&str>) -> Result<String> {
        let name = requested
            .map(str::trim)
            .unwrap_or(self.relations.default_type.as_str());
        if !self.relations.is_known_type(name) {
            return Err(CrmError::invalid(
                "relation_type",
                format!(
                    "unknown relation type '{}', expected one of {:?}",
                    name,
                    self.relations.type_names()
                ),
            ));
        }
        Ok(name.to_string())
    }

    /// Re-derive a task's schedule status after a committed relation change.
    ///
    /// Failures are logged and swallowed: the mutation already happened and
    /// the next refresh or reconcile sweep will fix the cached value.
    fn refresh_after_mutation(&self, task_id: &str) {
        if let Err(e) = self.refresh_schedule_status(task_id) {
            warn!(task_id = %task_id, error = %e, "Schedule status refresh failed");
        }
    }
}

fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// Current time at the store's millisecond precision.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
