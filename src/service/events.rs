//! Calendar event CRUD and calendar views.

use super::{ScheduleService, new_id, now};
use crate::error::Result;
use crate::filters::EventFilter;
use crate::recurrence;
use crate::store::Store;
use crate::types::{AssignableKind, CalendarEvent, EventUpdate, NewEvent, Occurrence, Session};
use crate::validate::{resolve_assignee, validate_recurrence, validate_title, validate_window};
use chrono::{DateTime, SubsecRound, Utc};
use tracing::info;

pub const DEFAULT_CATEGORY: &str = "general";

fn category_or_default(category: Option<String>) -> String {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

impl<S: Store> ScheduleService<S> {
    /// Validate input into an event owned by the session's user. Nothing is
    /// written.
    pub(super) fn build_event(&self, session: &Session, input: NewEvent) -> Result<CalendarEvent> {
        let title = validate_title(&input.title)?;
        let start = input.start.trunc_subsecs(3);
        let end = input.end.trunc_subsecs(3);
        validate_window(start, end)?;
        if let Some(ref rule) = input.recurrence {
            validate_recurrence(rule, start)?;
        }
        let assigned_to = resolve_assignee(
            input.assigned_to.as_deref(),
            input.assigned_to_type,
            AssignableKind::CalendarEvent,
        )?;

        let at = now();
        Ok(CalendarEvent {
            id: new_id(),
            title,
            description: input.description,
            start,
            end,
            category: category_or_default(input.category),
            recurrence: input.recurrence,
            assigned_to,
            department: input.department.or_else(|| session.department.clone()),
            user_id: session.user_id.clone(),
            created_at: at,
            updated_at: at,
        })
    }

    /// Merge an update into an event, validate the result and persist it.
    pub(super) fn apply_event_update(
        &self,
        mut event: CalendarEvent,
        update: EventUpdate,
    ) -> Result<CalendarEvent> {
        if let Some(title) = update.title {
            event.title = validate_title(&title)?;
        }
        if let Some(start) = update.start {
            event.start = start.trunc_subsecs(3);
        }
        if let Some(end) = update.end {
            event.end = end.trunc_subsecs(3);
        }
        validate_window(event.start, event.end)?;
        if update.recurrence.is_some() {
            event.recurrence = update.recurrence;
        }
        if let Some(ref rule) = event.recurrence {
            validate_recurrence(rule, event.start)?;
        }
        let reassigned = update.assigned_to.is_some() || update.assigned_to_type.is_some();
        if reassigned {
            event.assigned_to = resolve_assignee(
                update.assigned_to.as_deref(),
                update.assigned_to_type,
                AssignableKind::CalendarEvent,
            )?;
        }
        if update.description.is_some() {
            event.description = update.description;
        }
        if update.category.is_some() {
            event.category = category_or_default(update.category);
        }
        if update.department.is_some() {
            event.department = update.department;
        }
        event.updated_at = now();

        self.store.update_event(&event)?;
        if reassigned {
            self.sync_assignment(&event.id, AssignableKind::CalendarEvent, event.assigned_to.as_ref())?;
        }
        Ok(event)
    }

    /// Create a standalone event, not linked to any task.
    pub fn create_event(&self, session: &Session, input: NewEvent) -> Result<CalendarEvent> {
        let event = self.build_event(session, input)?;
        self.store.insert_event(&event)?;
        if let Err(e) =
            self.sync_assignment(&event.id, AssignableKind::CalendarEvent, event.assigned_to.as_ref())
        {
            self.discard_event(&event);
            return Err(e);
        }
        info!(event_id = %event.id, "Created event");
        Ok(event)
    }

    pub fn get_event(&self, event_id: &str) -> Result<CalendarEvent> {
        self.require_event(event_id)
    }

    pub fn update_event(&self, event_id: &str, update: EventUpdate) -> Result<CalendarEvent> {
        let event = self.require_event(event_id)?;
        self.apply_event_update(event, update)
    }

    /// Calendar view. With department scoping on, only the session's
    /// department is visible.
    pub fn list_events(&self, session: &Session, filter: &EventFilter) -> Result<Vec<CalendarEvent>> {
        let events = self.store.list_events(self.scope(session))?;
        Ok(filter.apply(events))
    }

    /// Concrete occurrences of an event overlapping `[from, to)`.
    pub fn occurrences(
        &self,
        event_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Occurrence>> {
        validate_window(from, to)?;
        let event = self.require_event(event_id)?;
        Ok(recurrence::occurrences(&event, from, to))
    }
}
