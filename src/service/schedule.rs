//! Persistence of the cached schedule status.

use super::{ScheduleService, now};
use crate::error::{CrmError, Result};
use crate::schedule::{derive_schedule_status, is_sweep_overridable};
use crate::store::Store;
use crate::types::{ReconcileReport, ScheduleStatus, Task};
use tracing::{debug, info};

impl<S: Store> ScheduleService<S> {
    /// Recompute a task's status from its live events and persist it if it
    /// changed. Clears a manual `PartiallyScheduled`.
    pub fn refresh_schedule_status(&self, task_id: &str) -> Result<ScheduleStatus> {
        let task = self.require_task(task_id)?;
        let events = self.live_events_for_task(task_id)?;
        let derived = derive_schedule_status(&events);
        if derived != task.schedule_status {
            self.store.set_schedule_status(task_id, derived, now())?;
            debug!(
                task_id = %task_id,
                from = task.schedule_status.as_str(),
                to = derived.as_str(),
                "Schedule status changed"
            );
        }
        Ok(derived)
    }

    /// Mark a task `PartiallyScheduled`. This is the only way to reach that
    /// state; `Scheduled` and `Unscheduled` are derived and rejected here.
    pub fn update_task_schedule_status(&self, task_id: &str, status: ScheduleStatus) -> Result<Task> {
        if status != ScheduleStatus::PartiallyScheduled {
            return Err(CrmError::invalid(
                "schedule_status",
                format!(
                    "'{}' is derived from linked events and cannot be set manually",
                    status.as_str()
                ),
            ));
        }
        let mut task = self.require_task(task_id)?;
        let at = now();
        self.store.set_schedule_status(task_id, status, at)?;
        task.schedule_status = status;
        task.updated_at = at;
        info!(task_id = %task_id, status = status.as_str(), "Schedule status set manually");
        Ok(task)
    }

    /// Re-derive every task's cached status.
    ///
    /// Tasks marked `PartiallyScheduled` are left alone and counted in
    /// `skipped_manual`.
    pub fn reconcile_schedule_statuses(&self) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();
        for task in self.store.list_tasks(None)? {
            report.examined += 1;
            if !is_sweep_overridable(task.schedule_status) {
                report.skipped_manual += 1;
                continue;
            }
            let derived = derive_schedule_status(&self.live_events_for_task(&task.id)?);
            if derived != task.schedule_status {
                self.store.set_schedule_status(&task.id, derived, now())?;
                report.updated += 1;
            }
        }
        info!(
            examined = report.examined,
            updated = report.updated,
            skipped_manual = report.skipped_manual,
            "Reconciled schedule statuses"
        );
        Ok(report)
    }
}
