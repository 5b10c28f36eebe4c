//! Configuration types and structures.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub relations: RelationsConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("crm-schedule/crm.db")
}

/// A named kind of task/event relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationTypeDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Relation type configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationsConfig {
    #[serde(default = "default_relation_types")]
    pub types: Vec<RelationTypeDefinition>,

    /// Type used when a caller does not name one.
    #[serde(default = "default_relation_type")]
    pub default_type: String,
}

impl Default for RelationsConfig {
    fn default() -> Self {
        Self {
            types: default_relation_types(),
            default_type: default_relation_type(),
        }
    }
}

fn default_relation_type() -> String {
    "working_session".to_string()
}

fn default_relation_types() -> Vec<RelationTypeDefinition> {
    [
        ("working_session", "Time blocked to work on the task"),
        ("meeting", "A meeting held about the task"),
        ("deadline", "Calendar marker for the task's due date"),
        ("follow_up", "Follow-up scheduled after the task"),
    ]
    .into_iter()
    .map(|(name, description)| RelationTypeDefinition {
        name: name.to_string(),
        description: Some(description.to_string()),
    })
    .collect()
}

impl RelationsConfig {
    pub fn is_known_type(&self, relation_type: &str) -> bool {
        self.types.iter().any(|t| t.name == relation_type)
    }

    pub fn type_names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.name.as_str()).collect()
    }

    /// Validate the relations configuration.
    pub fn validate(&self) -> Result<()> {
        if self.types.is_empty() {
            return Err(anyhow!("At least one relation type must be defined"));
        }

        let mut seen = HashSet::new();
        for def in &self.types {
            if def.name.trim().is_empty() {
                return Err(anyhow!("Relation type names must not be empty"));
            }
            if !seen.insert(def.name.as_str()) {
                return Err(anyhow!("Duplicate relation type '{}'", def.name));
            }
        }

        if !self.is_known_type(&self.default_type) {
            return Err(anyhow!(
                "Default relation type '{}' is not one of {:?}",
                self.default_type,
                self.type_names()
            ));
        }

        Ok(())
    }
}

/// Scheduling behavior.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScheduleConfig {
    /// Restrict list views to the acting session's department.
    #[serde(default)]
    pub department_scoped: bool,
}

impl Config {
    /// Load configuration from a single file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.relations.validate()
    }

    /// Ensure the database directory exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.server.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}
