//! Calendar event rows.

use super::{Database, assignee_columns, from_ms, parse_assignee, to_ms};
use crate::error::{CrmError, Result};
use crate::types::{CalendarEvent, Recurrence};
use rusqlite::{OptionalExtension, Row, params};

const EVENT_COLUMNS: &str = "id, title, description, start_at, end_at, category, recurrence,
     assigned_to, assigned_to_type, department, user_id, created_at, updated_at";

pub fn parse_event_row(row: &Row) -> rusqlite::Result<CalendarEvent> {
    let recurrence_json: Option<String> = row.get("recurrence")?;
    let recurrence = recurrence_json
        .map(|s| serde_json::from_str::<Recurrence>(&s))
        .transpose()
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;

    Ok(CalendarEvent {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        start: from_ms(row.get("start_at")?)?,
        end: from_ms(row.get("end_at")?)?,
        category: row.get("category")?,
        recurrence,
        assigned_to: parse_assignee(row.get("assigned_to")?, row.get("assigned_to_type")?)?,
        department: row.get("department")?,
        user_id: row.get("user_id")?,
        created_at: from_ms(row.get("created_at")?)?,
        updated_at: from_ms(row.get("updated_at")?)?,
    })
}

fn recurrence_json(event: &CalendarEvent) -> Result<Option<String>> {
    Ok(event
        .recurrence
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?)
}

impl Database {
    pub fn insert_event(&self, event: &CalendarEvent) -> Result<()> {
        let recurrence = recurrence_json(event)?;
        let (assigned_to, assigned_to_type) = assignee_columns(event.assigned_to.as_ref());
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO calendar_events (
                    id, title, description, start_at, end_at, category, recurrence,
                    assigned_to, assigned_to_type, department, user_id, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    event.id,
                    event.title,
                    event.description,
                    to_ms(event.start),
                    to_ms(event.end),
                    event.category,
                    recurrence,
                    assigned_to,
                    assigned_to_type,
                    event.department,
                    event.user_id,
                    to_ms(event.created_at),
                    to_ms(event.updated_at),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_event(&self, id: &str) -> Result<Option<CalendarEvent>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM calendar_events WHERE id = ?1", EVENT_COLUMNS);
            let event = conn
                .query_row(&sql, params![id], parse_event_row)
                .optional()?;
            Ok(event)
        })
    }

    pub fn update_event(&self, event: &CalendarEvent) -> Result<()> {
        let recurrence = recurrence_json(event)?;
        let (assigned_to, assigned_to_type) = assignee_columns(event.assigned_to.as_ref());
        let changed = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE calendar_events SET
                    title = ?2, description = ?3, start_at = ?4, end_at = ?5, category = ?6,
                    recurrence = ?7, assigned_to = ?8, assigned_to_type = ?9, department = ?10,
                    updated_at = ?11
                 WHERE id = ?1",
                params![
                    event.id,
                    event.title,
                    event.description,
                    to_ms(event.start),
                    to_ms(event.end),
                    event.category,
                    recurrence,
                    assigned_to,
                    assigned_to_type,
                    event.department,
                    to_ms(event.updated_at),
                ],
            )?)
        })?;
        if changed == 0 {
            return Err(CrmError::event_not_found(&event.id));
        }
        Ok(())
    }

    pub fn delete_event(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM calendar_events WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
    }

    /// All events ordered by start time, optionally restricted to one department.
    pub fn list_events(&self, department: Option<&str>) -> Result<Vec<CalendarEvent>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM calendar_events
                 WHERE (?1 IS NULL OR department = ?1)
                 ORDER BY start_at, rowid",
                EVENT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let events = stmt
                .query_map(params![department], parse_event_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(events)
        })
    }
}
