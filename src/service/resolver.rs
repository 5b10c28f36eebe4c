//! Hydration of tasks with their events and events with their task.
//!
//! Relations carry no foreign keys, so either endpoint may have been deleted
//! underneath them. Such orphans are skipped, never surfaced as errors.

use super::ScheduleService;
use crate::error::Result;
use crate::store::{RelationFilter, Store};
use crate::types::{AssignableKind, CalendarEvent, EventDetail, EventWithTask, Task, TaskWithEvents};
use std::collections::HashSet;
use tracing::debug;

impl<S: Store> ScheduleService<S> {
    /// Live events linked to a task, ordered by start time. An event linked
    /// under several relation types appears once.
    pub(super) fn live_events_for_task(&self, task_id: &str) -> Result<Vec<CalendarEvent>> {
        let relations = self.store.find_relations(&RelationFilter::for_task(task_id))?;
        let mut seen = HashSet::new();
        let mut events = Vec::new();
        for relation in relations {
            if !seen.insert(relation.event_id.clone()) {
                continue;
            }
            match self.store.get_event(&relation.event_id)? {
                Some(event) => events.push(event),
                None => debug!(
                    relation_id = %relation.id,
                    event_id = %relation.event_id,
                    "Skipping orphaned relation"
                ),
            }
        }
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        Ok(events)
    }

    /// First live task linked to an event, by relation creation order.
    fn first_live_task(&self, event_id: &str) -> Result<Option<Task>> {
        for relation in self.store.find_relations(&RelationFilter::for_event(event_id))? {
            if let Some(task) = self.store.get_task(&relation.task_id)? {
                return Ok(Some(task));
            }
            debug!(
                relation_id = %relation.id,
                task_id = %relation.task_id,
                "Skipping orphaned relation"
            );
        }
        Ok(None)
    }

    pub fn get_task_with_events(&self, task_id: &str) -> Result<TaskWithEvents> {
        let task = self.require_task(task_id)?;
        let events = self.live_events_for_task(task_id)?;
        Ok(TaskWithEvents { task, events })
    }

    /// The event and the task it belongs to.
    ///
    /// An event may be linked to several tasks; the oldest live relation
    /// wins. `task` is `None` when no linked task still exists.
    pub fn get_event_with_task(&self, event_id: &str) -> Result<EventWithTask> {
        let event = self.require_event(event_id)?;
        let task = self.first_live_task(event_id)?;
        Ok(EventWithTask { event, task })
    }

    pub fn get_event_with_task_and_assignment(&self, event_id: &str) -> Result<EventDetail> {
        let EventWithTask { event, task } = self.get_event_with_task(event_id)?;
        let assignment = self.resolve_assignment(event_id, AssignableKind::CalendarEvent)?;
        Ok(EventDetail {
            event,
            task,
            assignment,
        })
    }
}
