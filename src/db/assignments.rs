//! Polymorphic assignment rows.

use super::{Database, bad_enum, from_ms, to_ms};
use crate::error::Result;
use crate::types::{AssignableKind, Assignee, AssigneeKind, Assignment};
use rusqlite::{OptionalExtension, Row, params};

fn parse_assignment_row(row: &Row) -> rusqlite::Result<Assignment> {
    let assignable_type: String = row.get("assignable_type")?;
    let target_type: String = row.get("assigned_to_type")?;
    let target_id: String = row.get("assigned_to")?;

    let kind = AssigneeKind::from_str(&target_type)
        .ok_or_else(|| bad_enum("assigned_to_type", &target_type))?;

    Ok(Assignment {
        assignable_id: row.get("assignable_id")?,
        assignable_type: AssignableKind::from_str(&assignable_type)
            .ok_or_else(|| bad_enum("assignable_type", &assignable_type))?,
        target: Assignee::from_parts(kind, target_id),
        created_at: from_ms(row.get("created_at")?)?,
    })
}

impl Database {
    pub fn get_assignment(
        &self,
        assignable_id: &str,
        kind: AssignableKind,
    ) -> Result<Option<Assignment>> {
        self.with_conn(|conn| {
            let assignment = conn
                .query_row(
                    "SELECT assignable_id, assignable_type, assigned_to, assigned_to_type, created_at
                     FROM assignments WHERE assignable_id = ?1 AND assignable_type = ?2",
                    params![assignable_id, kind.as_str()],
                    parse_assignment_row,
                )
                .optional()?;
            Ok(assignment)
        })
    }

    /// Insert an assignment. A second row for the same assignable is a conflict.
    pub fn insert_assignment(&self, assignment: &Assignment) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO assignments (
                    assignable_id, assignable_type, assigned_to, assigned_to_type, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    assignment.assignable_id,
                    assignment.assignable_type.as_str(),
                    assignment.target.id(),
                    assignment.target.kind().as_str(),
                    to_ms(assignment.created_at),
                ],
            )?;
            Ok(())
        })
    }

    pub fn delete_assignment(&self, assignable_id: &str, kind: AssignableKind) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM assignments WHERE assignable_id = ?1 AND assignable_type = ?2",
                params![assignable_id, kind.as_str()],
            )?;
            Ok(removed > 0)
        })
    }
}
