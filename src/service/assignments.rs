//! Polymorphic assignment resolution.

use super::{ScheduleService, now};
use crate::error::{CrmError, Result};
use crate::store::Store;
use crate::types::{AssignableKind, Assignee, Assignment, ResolvedAssignment};
use crate::validate::check_assignable;
use tracing::{debug, error};

impl<S: Store> ScheduleService<S> {
    /// Current assignment of an entity, with the target's display details.
    ///
    /// `display` is `None` when the user, team or contact has since been
    /// removed from the directory.
    pub fn resolve_assignment(
        &self,
        assignable_id: &str,
        kind: AssignableKind,
    ) -> Result<Option<ResolvedAssignment>> {
        let Some(assignment) = self.store.get_assignment(assignable_id, kind)? else {
            return Ok(None);
        };
        let display = self.store.get_display_entity(&assignment.target)?;
        if display.is_none() {
            debug!(
                assignable_id = %assignable_id,
                target = %assignment.target.id(),
                "Assignment target no longer exists"
            );
        }
        Ok(Some(ResolvedAssignment {
            assignable_id: assignment.assignable_id,
            assignable_type: assignment.assignable_type,
            target: assignment.target,
            display,
        }))
    }

    /// Replace an entity's assignment.
    ///
    /// Tasks and events also carry their assignee inline; that copy is
    /// updated to match. The old row is deleted before the new one is
    /// inserted, so if the insert fails the entity is left unassigned and the
    /// error says so.
    pub fn assign(
        &self,
        assignable_id: &str,
        kind: AssignableKind,
        target: Assignee,
    ) -> Result<Assignment> {
        check_assignable(kind, target.kind())?;
        match kind {
            AssignableKind::Task => {
                let mut task = self.require_task(assignable_id)?;
                if task.assigned_to.as_ref() != Some(&target) {
                    task.assigned_to = Some(target.clone());
                    task.updated_at = now();
                    self.store.update_task(&task)?;
                }
            }
            AssignableKind::CalendarEvent => {
                let mut event = self.require_event(assignable_id)?;
                if event.assigned_to.as_ref() != Some(&target) {
                    event.assigned_to = Some(target.clone());
                    event.updated_at = now();
                    self.store.update_event(&event)?;
                }
            }
            AssignableKind::Activity => {}
        }
        self.replace_assignment(assignable_id, kind, target)
    }

    fn replace_assignment(
        &self,
        assignable_id: &str,
        kind: AssignableKind,
        target: Assignee,
    ) -> Result<Assignment> {
        let assignment = Assignment {
            assignable_id: assignable_id.to_string(),
            assignable_type: kind,
            target,
            created_at: now(),
        };
        self.store.delete_assignment(assignable_id, kind)?;
        if let Err(e) = self.store.insert_assignment(&assignment) {
            error!(
                assignable_id = %assignable_id,
                kind = kind.as_str(),
                error = %e,
                "Assignment lost after replacing"
            );
            return Err(CrmError::store(format!(
                "assignment lost for {} {}: {}",
                kind.as_str(),
                assignable_id,
                e
            )));
        }
        debug!(assignable_id = %assignable_id, kind = kind.as_str(), "Assignment replaced");
        Ok(assignment)
    }

    /// Remove an entity's assignment, inline copy included. Returns whether
    /// an assignment row existed.
    pub fn unassign(&self, assignable_id: &str, kind: AssignableKind) -> Result<bool> {
        match kind {
            AssignableKind::Task => {
                if let Some(mut task) = self.store.get_task(assignable_id)?
                    && task.assigned_to.is_some()
                {
                    task.assigned_to = None;
                    task.updated_at = now();
                    self.store.update_task(&task)?;
                }
            }
            AssignableKind::CalendarEvent => {
                if let Some(mut event) = self.store.get_event(assignable_id)?
                    && event.assigned_to.is_some()
                {
                    event.assigned_to = None;
                    event.updated_at = now();
                    self.store.update_event(&event)?;
                }
            }
            AssignableKind::Activity => {}
        }
        self.store.delete_assignment(assignable_id, kind)
    }

    /// Mirror an already-stored inline `assigned_to` into the assignment table.
    pub(super) fn sync_assignment(
        &self,
        assignable_id: &str,
        kind: AssignableKind,
        target: Option<&Assignee>,
    ) -> Result<()> {
        match target {
            Some(target) => self
                .replace_assignment(assignable_id, kind, target.clone())
                .map(|_| ()),
            None => self.store.delete_assignment(assignable_id, kind).map(|_| ()),
        }
    }
}
