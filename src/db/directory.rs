//! Users, teams and contacts: the entities an assignment can point at.

use super::{Database, to_ms};
use crate::error::Result;
use crate::types::{Assignee, AssigneeKind, Contact, DisplayEntity, Team, User};
use rusqlite::{OptionalExtension, params};

impl Database {
    pub fn insert_user(&self, user: &User) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, department, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.id,
                    user.name,
                    user.email,
                    user.department,
                    to_ms(user.created_at)
                ],
            )?;
            Ok(())
        })
    }

    pub fn insert_team(&self, team: &Team) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO teams (id, name, department, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![team.id, team.name, team.department, to_ms(team.created_at)],
            )?;
            Ok(())
        })
    }

    pub fn insert_contact(&self, contact: &Contact) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO contacts (id, name, email, company, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    contact.id,
                    contact.name,
                    contact.email,
                    contact.company,
                    to_ms(contact.created_at)
                ],
            )?;
            Ok(())
        })
    }

    /// Look up the display name (and email, where the entity has one) of an
    /// assignment target. `None` when the entity has been removed.
    pub fn get_display_entity(&self, target: &Assignee) -> Result<Option<DisplayEntity>> {
        let sql = match target.kind() {
            AssigneeKind::User => "SELECT name, email FROM users WHERE id = ?1",
            AssigneeKind::Team => "SELECT name, NULL FROM teams WHERE id = ?1",
            AssigneeKind::Contact => "SELECT name, email FROM contacts WHERE id = ?1",
        };
        self.with_conn(|conn| {
            let found = conn
                .query_row(sql, params![target.id()], |row| {
                    Ok(DisplayEntity {
                        id: target.id().to_string(),
                        kind: target.kind(),
                        name: row.get(0)?,
                        email: row.get(1)?,
                    })
                })
                .optional()?;
            Ok(found)
        })
    }
}
