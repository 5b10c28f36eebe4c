//! Relation store operations.

use super::{ScheduleService, new_id, now};
use crate::error::Result;
use crate::store::{RelationFilter, Store};
use crate::types::Relation;
use tracing::{debug, info};

impl<S: Store> ScheduleService<S> {
    /// Link an existing task to an existing event.
    ///
    /// `relation_type` defaults to the configured default type. A second
    /// relation with the same task, event and type is a `Conflict`.
    pub fn create_relation(
        &self,
        task_id: &str,
        event_id: &str,
        relation_type: Option<&str>,
    ) -> Result<Relation> {
        let relation_type = self.relation_type(relation_type)?;
        self.require_task(task_id)?;
        self.require_event(event_id)?;

        let relation = Relation {
            id: new_id(),
            task_id: task_id.to_string(),
            event_id: event_id.to_string(),
            relation_type,
            created_at: now(),
        };
        self.store.insert_relation(&relation)?;
        info!(
            task_id = %task_id,
            event_id = %event_id,
            relation_type = %relation.relation_type,
            "Linked event to task"
        );

        self.refresh_after_mutation(task_id);
        Ok(relation)
    }

    /// Remove every relation between the pair. Returns the number removed;
    /// removing nothing is not an error.
    pub fn delete_relation(&self, task_id: &str, event_id: &str) -> Result<usize> {
        let removed = self
            .store
            .delete_relations(&RelationFilter::for_pair(task_id, event_id))?;
        debug!(task_id = %task_id, event_id = %event_id, removed, "Deleted relations");
        if removed > 0 {
            self.refresh_after_mutation(task_id);
        }
        Ok(removed)
    }

    /// Remove a single relation by id. Returns whether it existed.
    pub fn delete_relation_by_id(&self, relation_id: &str) -> Result<bool> {
        let filter = RelationFilter::by_id(relation_id);
        let Some(relation) = self.store.find_relations(&filter)?.into_iter().next() else {
            return Ok(false);
        };
        let removed = self.store.delete_relations(&filter)? > 0;
        if removed {
            self.refresh_after_mutation(&relation.task_id);
        }
        Ok(removed)
    }

    /// Relations of a task, oldest first. Empty when there are none.
    pub fn list_relations_for_task(&self, task_id: &str) -> Result<Vec<Relation>> {
        self.store.find_relations(&RelationFilter::for_task(task_id))
    }

    /// Relations of an event, oldest first. Empty when there are none.
    pub fn list_relations_for_event(&self, event_id: &str) -> Result<Vec<Relation>> {
        self.store.find_relations(&RelationFilter::for_event(event_id))
    }
}
