//! `directory` subcommands: the users, teams and contacts assignments point at.

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum DirectoryCommand {
    /// Add a user. Uses the global --department.
    AddUser {
        id: String,
        name: String,

        #[arg(long)]
        email: Option<String>,
    },

    /// Add a team. Uses the global --department.
    AddTeam { id: String, name: String },

    /// Add an external contact
    AddContact {
        id: String,
        name: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        company: Option<String>,
    },

    /// Show the display entity an assignee id resolves to
    Lookup {
        /// user, team or contact
        #[arg(value_parser = super::task::parse_assignee_kind)]
        kind: crate::types::AssigneeKind,
        id: String,
    },
}
