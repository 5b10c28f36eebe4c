//! Task rows.

use super::{Database, assignee_columns, bad_enum, from_ms, from_opt_ms, parse_assignee, to_ms};
use crate::error::{CrmError, Result};
use crate::types::{Priority, ScheduleStatus, Task, TaskStatus};
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, params};

const TASK_COLUMNS: &str = "id, title, description, status, priority, due_date, assigned_to,
     assigned_to_type, department, schedule_status, created_by, created_at, updated_at";

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let status: String = row.get("status")?;
    let priority: String = row.get("priority")?;
    let schedule_status: String = row.get("schedule_status")?;

    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: TaskStatus::from_str(&status).ok_or_else(|| bad_enum("status", &status))?,
        priority: Priority::from_str(&priority).ok_or_else(|| bad_enum("priority", &priority))?,
        due_date: from_opt_ms(row.get("due_date")?)?,
        assigned_to: parse_assignee(row.get("assigned_to")?, row.get("assigned_to_type")?)?,
        department: row.get("department")?,
        schedule_status: ScheduleStatus::from_str(&schedule_status)
            .ok_or_else(|| bad_enum("schedule_status", &schedule_status))?,
        created_by: row.get("created_by")?,
        created_at: from_ms(row.get("created_at")?)?,
        updated_at: from_ms(row.get("updated_at")?)?,
    })
}

impl Database {
    pub fn insert_task(&self, task: &Task) -> Result<()> {
        let (assigned_to, assigned_to_type) = assignee_columns(task.assigned_to.as_ref());
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (
                    id, title, description, status, priority, due_date, assigned_to,
                    assigned_to_type, department, schedule_status, created_by, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    task.id,
                    task.title,
                    task.description,
                    task.status.as_str(),
                    task.priority.as_str(),
                    task.due_date.map(to_ms),
                    assigned_to,
                    assigned_to_type,
                    task.department,
                    task.schedule_status.as_str(),
                    task.created_by,
                    to_ms(task.created_at),
                    to_ms(task.updated_at),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS);
            let task = conn
                .query_row(&sql, params![id], parse_task_row)
                .optional()?;
            Ok(task)
        })
    }

    pub fn update_task(&self, task: &Task) -> Result<()> {
        let (assigned_to, assigned_to_type) = assignee_columns(task.assigned_to.as_ref());
        let changed = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE tasks SET
                    title = ?2, description = ?3, status = ?4, priority = ?5, due_date = ?6,
                    assigned_to = ?7, assigned_to_type = ?8, department = ?9,
                    schedule_status = ?10, updated_at = ?11
                 WHERE id = ?1",
                params![
                    task.id,
                    task.title,
                    task.description,
                    task.status.as_str(),
                    task.priority.as_str(),
                    task.due_date.map(to_ms),
                    assigned_to,
                    assigned_to_type,
                    task.department,
                    task.schedule_status.as_str(),
                    to_ms(task.updated_at),
                ],
            )?)
        })?;
        if changed == 0 {
            return Err(CrmError::task_not_found(&task.id));
        }
        Ok(())
    }

    pub fn set_schedule_status(
        &self,
        id: &str,
        status: ScheduleStatus,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let changed = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE tasks SET schedule_status = ?2, updated_at = ?3 WHERE id = ?1",
                params![id, status.as_str(), to_ms(at)],
            )?)
        })?;
        if changed == 0 {
            return Err(CrmError::task_not_found(id));
        }
        Ok(())
    }

    pub fn delete_task(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
    }

    /// All tasks, oldest first, optionally restricted to one department.
    pub fn list_tasks(&self, department: Option<&str>) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM tasks
                 WHERE (?1 IS NULL OR department = ?1)
                 ORDER BY created_at, rowid",
                TASK_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt
                .query_map(params![department], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }
}
