//! SQLite-backed store for tasks, calendar events and their relations.

pub mod assignments;
pub mod directory;
pub mod events;
pub mod relations;
pub mod tasks;

use crate::error::{CrmError, Result};
use crate::store::{RelationFilter, Store};
use crate::types::{
    AssignableKind, Assignee, Assignment, CalendarEvent, DisplayEntity, Relation, ScheduleStatus,
    Task,
};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Database handle wrapping a SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;

        // WAL for concurrent readers; a short busy timeout for concurrent writers
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;",
        )?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;
        debug!(path = %path.display(), "Opened database");

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations.
    fn run_migrations(&self) -> Result<()> {
        let mut conn = self.lock()?;
        embedded::migrations::runner()
            .run(&mut *conn)
            .map_err(|e| CrmError::store(format!("migration failed: {}", e)))?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CrmError::store("database connection lock poisoned"))
    }

    /// Execute a function with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }
}

/// Timestamps are stored as integer milliseconds since the Unix epoch.
pub(crate) fn to_ms(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn from_ms(ms: i64) -> rusqlite::Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single().ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Integer,
            format!("timestamp out of range: {}", ms).into(),
        )
    })
}

pub(crate) fn from_opt_ms(ms: Option<i64>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    ms.map(from_ms).transpose()
}

/// Error for a TEXT column holding a value outside its enum.
pub(crate) fn bad_enum(column: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        format!("invalid {} value: {}", column, value).into(),
    )
}

/// Rebuild an assignee from its two nullable columns.
pub(crate) fn parse_assignee(
    id: Option<String>,
    kind: Option<String>,
) -> rusqlite::Result<Option<Assignee>> {
    match (id, kind) {
        (Some(id), Some(kind)) => {
            let kind = crate::types::AssigneeKind::from_str(&kind)
                .ok_or_else(|| bad_enum("assigned_to_type", &kind))?;
            Ok(Some(Assignee::from_parts(kind, id)))
        }
        _ => Ok(None),
    }
}

pub(crate) fn assignee_columns(assignee: Option<&Assignee>) -> (Option<&str>, Option<&str>) {
    match assignee {
        Some(a) => (Some(a.id()), Some(a.kind().as_str())),
        None => (None, None),
    }
}

impl Store for Database {
    fn insert_task(&self, task: &Task) -> Result<()> {
        Database::insert_task(self, task)
    }

    fn get_task(&self, id: &str) -> Result<Option<Task>> {
        Database::get_task(self, id)
    }

    fn update_task(&self, task: &Task) -> Result<()> {
        Database::update_task(self, task)
    }

    fn set_schedule_status(
        &self,
        id: &str,
        status: ScheduleStatus,
        at: DateTime<Utc>,
    ) -> Result<()> {
        Database::set_schedule_status(self, id, status, at)
    }

    fn delete_task(&self, id: &str) -> Result<bool> {
        Database::delete_task(self, id)
    }

    fn list_tasks(&self, department: Option<&str>) -> Result<Vec<Task>> {
        Database::list_tasks(self, department)
    }

    fn insert_event(&self, event: &CalendarEvent) -> Result<()> {
        Database::insert_event(self, event)
    }

    fn get_event(&self, id: &str) -> Result<Option<CalendarEvent>> {
        Database::get_event(self, id)
    }

    fn update_event(&self, event: &CalendarEvent) -> Result<()> {
        Database::update_event(self, event)
    }

    fn delete_event(&self, id: &str) -> Result<bool> {
        Database::delete_event(self, id)
    }

    fn list_events(&self, department: Option<&str>) -> Result<Vec<CalendarEvent>> {
        Database::list_events(self, department)
    }

    fn insert_relation(&self, relation: &Relation) -> Result<()> {
        Database::insert_relation(self, relation)
    }

    fn find_relations(&self, filter: &RelationFilter) -> Result<Vec<Relation>> {
        Database::find_relations(self, filter)
    }

    fn delete_relations(&self, filter: &RelationFilter) -> Result<usize> {
        Database::delete_relations(self, filter)
    }

    fn get_assignment(
        &self,
        assignable_id: &str,
        kind: AssignableKind,
    ) -> Result<Option<Assignment>> {
        Database::get_assignment(self, assignable_id, kind)
    }

    fn insert_assignment(&self, assignment: &Assignment) -> Result<()> {
        Database::insert_assignment(self, assignment)
    }

    fn delete_assignment(&self, assignable_id: &str, kind: AssignableKind) -> Result<bool> {
        Database::delete_assignment(self, assignable_id, kind)
    }

    fn get_display_entity(&self, target: &Assignee) -> Result<Option<DisplayEntity>> {
        Database::get_display_entity(self, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millisecond_roundtrip_preserves_instant() {
        let at = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        assert_eq!(from_ms(to_ms(at)).unwrap(), at);
    }

    #[test]
    fn half_assignee_reads_as_none() {
        assert_eq!(parse_assignee(Some("u1".into()), None).unwrap(), None);
        assert!(parse_assignee(Some("u1".into()), Some("robot".into())).is_err());
    }

    #[test]
    fn migrations_create_relation_table() {
        let db = Database::open_in_memory().unwrap();
        let count: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE name = 'task_calendar_relations'",
                    [],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(count, 1);
    }
}
