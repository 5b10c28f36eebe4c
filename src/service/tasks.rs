//! Task CRUD and list views.

use super::{ScheduleService, new_id, now};
use crate::error::Result;
use crate::filters::TaskFilter;
use crate::store::Store;
use crate::types::{AssignableKind, NewTask, ScheduleStatus, Session, Task, TaskStatus, TaskUpdate};
use crate::validate::{resolve_assignee, validate_title};
use chrono::SubsecRound;
use tracing::{error, info};

impl<S: Store> ScheduleService<S> {
    /// Create a task. New tasks start `Unscheduled`.
    pub fn create_task(&self, session: &Session, input: NewTask) -> Result<Task> {
        let title = validate_title(&input.title)?;
        let assigned_to = resolve_assignee(
            input.assigned_to.as_deref(),
            input.assigned_to_type,
            AssignableKind::Task,
        )?;

        let at = now();
        let task = Task {
            id: new_id(),
            title,
            description: input.description,
            status: input.status.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            due_date: input.due_date.map(|d| d.trunc_subsecs(3)),
            assigned_to,
            department: input.department.or_else(|| session.department.clone()),
            schedule_status: ScheduleStatus::Unscheduled,
            created_by: Some(session.user_id.clone()),
            created_at: at,
            updated_at: at,
        };
        self.store.insert_task(&task)?;

        if let Err(e) = self.sync_assignment(&task.id, AssignableKind::Task, task.assigned_to.as_ref()) {
            if let Err(cleanup) = self.store.delete_task(&task.id) {
                error!(task_id = %task.id, error = %cleanup, "Failed to remove half-created task");
            }
            return Err(e);
        }
        info!(task_id = %task.id, "Created task");
        Ok(task)
    }

    pub fn get_task(&self, task_id: &str) -> Result<Task> {
        self.require_task(task_id)
    }

    /// Apply a partial update. Schedule status is not editable here; see
    /// [`Self::update_task_schedule_status`].
    pub fn update_task(&self, task_id: &str, update: TaskUpdate) -> Result<Task> {
        let mut task = self.require_task(task_id)?;

        if let Some(title) = update.title {
            task.title = validate_title(&title)?;
        }
        let reassigned = update.assigned_to.is_some() || update.assigned_to_type.is_some();
        if reassigned {
            task.assigned_to = resolve_assignee(
                update.assigned_to.as_deref(),
                update.assigned_to_type,
                AssignableKind::Task,
            )?;
        }
        if update.description.is_some() {
            task.description = update.description;
        }
        if let Some(status) = update.status {
            task.status = status;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(due) = update.due_date {
            task.due_date = Some(due.trunc_subsecs(3));
        }
        if update.department.is_some() {
            task.department = update.department;
        }
        task.updated_at = now();

        self.store.update_task(&task)?;
        if reassigned {
            self.sync_assignment(&task.id, AssignableKind::Task, task.assigned_to.as_ref())?;
        }
        Ok(task)
    }

    pub fn set_task_status(&self, task_id: &str, status: TaskStatus) -> Result<Task> {
        self.update_task(
            task_id,
            TaskUpdate {
                status: Some(status),
                ..Default::default()
            },
        )
    }

    /// Task list view. With department scoping on, only the session's
    /// department is visible.
    pub fn list_tasks(&self, session: &Session, filter: &TaskFilter) -> Result<Vec<Task>> {
        let tasks = self.store.list_tasks(self.scope(session))?;
        Ok(filter.apply(tasks))
    }
}
