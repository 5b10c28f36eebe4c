//! Task/event relation rows.

use super::{Database, from_ms, to_ms};
use crate::error::Result;
use crate::store::RelationFilter;
use crate::types::Relation;
use rusqlite::{Row, params};

fn parse_relation_row(row: &Row) -> rusqlite::Result<Relation> {
    Ok(Relation {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        event_id: row.get("event_id")?,
        relation_type: row.get("relation_type")?,
        created_at: from_ms(row.get("created_at")?)?,
    })
}

/// Build the WHERE clause and bound values for a filter.
fn where_clause(filter: &RelationFilter) -> (String, Vec<String>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();
    let columns = [
        ("id", &filter.id),
        ("task_id", &filter.task_id),
        ("event_id", &filter.event_id),
        ("relation_type", &filter.relation_type),
    ];
    for (column, value) in columns {
        if let Some(v) = value {
            clauses.push(format!("{} = ?", column));
            values.push(v.clone());
        }
    }
    if clauses.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), values)
    }
}

impl Database {
    /// Insert a relation. A duplicate (task, event, type) triple is a conflict.
    pub fn insert_relation(&self, relation: &Relation) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO task_calendar_relations (id, task_id, event_id, relation_type, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    relation.id,
                    relation.task_id,
                    relation.event_id,
                    relation.relation_type,
                    to_ms(relation.created_at),
                ],
            )?;
            Ok(())
        })
    }

    /// Matching relations, oldest first.
    pub fn find_relations(&self, filter: &RelationFilter) -> Result<Vec<Relation>> {
        let (where_sql, values) = where_clause(filter);
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT id, task_id, event_id, relation_type, created_at
                 FROM task_calendar_relations{} ORDER BY created_at, rowid",
                where_sql
            );
            let params_refs: Vec<&dyn rusqlite::ToSql> =
                values.iter().map(|v| v as &dyn rusqlite::ToSql).collect();

            let mut stmt = conn.prepare(&sql)?;
            let relations = stmt
                .query_map(params_refs.as_slice(), parse_relation_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(relations)
        })
    }

    /// Delete matching relations. An empty filter is refused.
    pub fn delete_relations(&self, filter: &RelationFilter) -> Result<usize> {
        filter.require_bounded()?;
        let (where_sql, values) = where_clause(filter);
        self.with_conn(|conn| {
            let sql = format!("DELETE FROM task_calendar_relations{}", where_sql);
            let params_refs: Vec<&dyn rusqlite::ToSql> =
                values.iter().map(|v| v as &dyn rusqlite::ToSql).collect();
            Ok(conn.execute(&sql, params_refs.as_slice())?)
        })
    }
}
