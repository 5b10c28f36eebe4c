//! Schedule-status derivation.
//!
//! Automatic derivation is binary: a task with no live linked events is
//! unscheduled, a task with one or more is scheduled. `PartiallyScheduled`
//! is never produced here; it is set explicitly and survives until the
//! next relation mutation re-derives the task.

use crate::types::{CalendarEvent, ScheduleStatus};

/// Derive a task's schedule status from its linked events.
pub fn derive_schedule_status(events: &[CalendarEvent]) -> ScheduleStatus {
    if events.is_empty() {
        ScheduleStatus::Unscheduled
    } else {
        ScheduleStatus::Scheduled
    }
}

/// Whether a reconciliation sweep may overwrite `current`.
///
/// Manual `PartiallyScheduled` is only cleared by a relation mutation.
pub fn is_sweep_overridable(current: ScheduleStatus) -> bool {
    current != ScheduleStatus::PartiallyScheduled
}
