//! Multi-step relation lifecycle operations.
//!
//! The store commits each call on its own, so operations that touch several
//! rows undo their own earlier writes when a later step fails.

use super::{ScheduleService, new_id, now};
use crate::error::{CrmError, Result};
use crate::store::{RelationFilter, Store};
use crate::types::{AssignableKind, CalendarEvent, EventUpdate, NewEvent, Relation, Session};
use std::collections::{BTreeSet, HashMap};
use tracing::{error, info, warn};

impl<S: Store> ScheduleService<S> {
    /// Create an event and link it to an existing task in one operation.
    ///
    /// If the assignment or relation cannot be written after the event was
    /// inserted, the event is deleted again and the original error returned.
    pub fn create_event_for_task(
        &self,
        session: &Session,
        task_id: &str,
        input: NewEvent,
        relation_type: Option<&str>,
    ) -> Result<CalendarEvent> {
        let event = self.build_event(session, input)?;
        let relation_type = self.relation_type(relation_type)?;
        self.require_task(task_id)?;

        self.store.insert_event(&event)?;

        let relation = Relation {
            id: new_id(),
            task_id: task_id.to_string(),
            event_id: event.id.clone(),
            relation_type,
            created_at: now(),
        };
        let linked = self
            .sync_assignment(&event.id, AssignableKind::CalendarEvent, event.assigned_to.as_ref())
            .and_then(|()| self.store.insert_relation(&relation));

        if let Err(e) = linked {
            warn!(
                task_id = %task_id,
                event_id = %event.id,
                error = %e,
                "Linking new event failed, removing it"
            );
            self.discard_event(&event);
            return Err(e);
        }

        info!(
            task_id = %task_id,
            event_id = %event.id,
            relation_type = %relation.relation_type,
            "Created event for task"
        );
        self.refresh_after_mutation(task_id);
        Ok(event)
    }

    /// Compensating cleanup for a half-created event. Failures here are
    /// logged; the caller reports the error that triggered the cleanup.
    pub(super) fn discard_event(&self, event: &CalendarEvent) {
        if event.assigned_to.is_some()
            && let Err(e) = self
                .store
                .delete_assignment(&event.id, AssignableKind::CalendarEvent)
        {
            error!(event_id = %event.id, error = %e, "Failed to remove assignment of discarded event");
        }
        if let Err(e) = self.store.delete_event(&event.id) {
            error!(event_id = %event.id, error = %e, "Failed to remove discarded event, it is now orphaned");
        }
    }

    /// Remove every relation between a task and an event. Both entities are
    /// kept. Calling this for an unlinked pair succeeds and removes nothing.
    pub fn unlink_event_from_task(&self, task_id: &str, event_id: &str) -> Result<usize> {
        self.delete_relation(task_id, event_id)
    }

    /// Same as [`Self::unlink_event_from_task`], addressed from the event side.
    pub fn unlink_task_from_event(&self, event_id: &str, task_id: &str) -> Result<usize> {
        self.delete_relation(task_id, event_id)
    }

    /// Update an event that must be linked to the given task.
    ///
    /// Only the event changes; relations and the task are untouched.
    pub fn update_event_for_task(
        &self,
        task_id: &str,
        event_id: &str,
        update: EventUpdate,
    ) -> Result<CalendarEvent> {
        self.require_task(task_id)?;
        let event = self.require_event(event_id)?;
        if self
            .store
            .find_relations(&RelationFilter::for_pair(task_id, event_id))?
            .is_empty()
        {
            return Err(CrmError::not_linked(task_id, event_id));
        }
        self.apply_event_update(event, update)
    }

    /// Delete an event, releasing its relations and assignment first, then
    /// re-derive every task it was linked to.
    pub fn delete_event(&self, event_id: &str) -> Result<()> {
        self.require_event(event_id)?;
        let filter = RelationFilter::for_event(event_id);
        let affected: BTreeSet<String> = self
            .store
            .find_relations(&filter)?
            .into_iter()
            .map(|r| r.task_id)
            .collect();

        self.store.delete_relations(&filter)?;
        self.store
            .delete_assignment(event_id, AssignableKind::CalendarEvent)?;
        self.store.delete_event(event_id)?;
        info!(event_id = %event_id, tasks = affected.len(), "Deleted event");

        for task_id in &affected {
            if self.store.get_task(task_id)?.is_some() {
                self.refresh_after_mutation(task_id);
            }
        }
        Ok(())
    }

    /// Delete a task with its relations and assignment. Linked events stay.
    pub fn delete_task(&self, task_id: &str) -> Result<()> {
        self.require_task(task_id)?;
        let released = self
            .store
            .delete_relations(&RelationFilter::for_task(task_id))?;
        self.store.delete_assignment(task_id, AssignableKind::Task)?;
        self.store.delete_task(task_id)?;
        info!(task_id = %task_id, released, "Deleted task");
        Ok(())
    }

    /// Remove relations whose task or event no longer exists. Returns the
    /// number removed.
    pub fn prune_orphaned_relations(&self) -> Result<usize> {
        let mut task_live: HashMap<String, bool> = HashMap::new();
        let mut event_live: HashMap<String, bool> = HashMap::new();
        let mut touched = BTreeSet::new();
        let mut pruned = 0;

        for relation in self.store.find_relations(&RelationFilter::default())? {
            let has_task = match task_live.get(&relation.task_id) {
                Some(&live) => live,
                None => {
                    let live = self.store.get_task(&relation.task_id)?.is_some();
                    task_live.insert(relation.task_id.clone(), live);
                    live
                }
            };
            let has_event = match event_live.get(&relation.event_id) {
                Some(&live) => live,
                None => {
                    let live = self.store.get_event(&relation.event_id)?.is_some();
                    event_live.insert(relation.event_id.clone(), live);
                    live
                }
            };
            if has_task && has_event {
                continue;
            }

            pruned += self
                .store
                .delete_relations(&RelationFilter::by_id(&relation.id))?;
            if has_task {
                touched.insert(relation.task_id);
            }
        }

        for task_id in &touched {
            self.refresh_after_mutation(task_id);
        }
        if pruned > 0 {
            info!(pruned, "Pruned orphaned relations");
        }
        Ok(pruned)
    }
}
