//! Configuration loader with tier-based merging.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    /// `$CWD/crm-schedule/`
    Project = 1,
    /// `~/.crm-schedule/`
    User = 2,
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        let user_dir = std::env::var("CRM_SCHEDULE_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".crm-schedule")));

        let project_dir = std::env::var("CRM_SCHEDULE_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("crm-schedule")));

        Self {
            project_dir,
            user_dir,
        }
    }

    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    /// Highest-priority file that contributed, if any.
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers with proper merging.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load a single explicit file on top of the defaults, skipping the
    /// project and user tiers.
    pub fn load_file(path: &Path) -> Result<Self> {
        let overlay = read_yaml(path)?
            .with_context(|| format!("Config file not found: {}", path.display()))?;
        let mut config = merge_over_defaults(vec![overlay])?;
        Self::apply_env_overrides(&mut config);
        config.validate()?;
        Ok(Self {
            paths: ConfigPaths::with_dirs(None, None),
            config,
            config_path: Some(path.to_path_buf()),
        })
    }

    /// Load configuration with explicit paths.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        if let Ok(explicit_path) = std::env::var("CRM_SCHEDULE_CONFIG_PATH") {
            return Self::load_file(Path::new(&explicit_path));
        }

        let mut overlays: Vec<Value> = Vec::new();
        let mut config_path = None;

        for (tier, dir) in [
            (ConfigTier::Project, &paths.project_dir),
            (ConfigTier::User, &paths.user_dir),
        ] {
            let Some(dir) = dir else { continue };
            let file = dir.join("config.yaml");
            match read_yaml(&file) {
                Ok(Some(value)) => {
                    debug!(%tier, path = %file.display(), "Loaded config tier");
                    overlays.push(value);
                    config_path = Some(file);
                }
                Ok(None) => {}
                Err(e) => warn!(%tier, path = %file.display(), error = %e, "Ignoring unreadable config"),
            }
        }

        let mut config = merge_over_defaults(overlays)?;
        Self::apply_env_overrides(&mut config);
        config.validate()?;

        Ok(Self {
            paths,
            config,
            config_path,
        })
    }

    fn apply_env_overrides(config: &mut Config) {
        if let Ok(db_path) = std::env::var("CRM_SCHEDULE_DB_PATH") {
            config.server.db_path = PathBuf::from(db_path);
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

/// Read a YAML file into a JSON value. `Ok(None)` when the file is absent
/// or holds only comments.
fn read_yaml(path: &Path) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid YAML in {}", path.display()))?;
    Ok((!value.is_null()).then_some(value))
}

fn merge_over_defaults(overlays: Vec<Value>) -> Result<Config> {
    let defaults = serde_json::to_value(Config::default())?;
    let merged = deep_merge_all(std::iter::once(defaults).chain(overlays));
    Ok(serde_json::from_value(merged)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join("config.yaml"), content).unwrap();
    }

    #[test]
    fn defaults_when_no_files() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );
        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        assert_eq!(loader.config().relations.default_type, "working_session");
        assert!(loader.config_path().is_none());
    }

    #[test]
    fn user_tier_overrides_project_field_by_field() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        let user = temp.path().join("user");
        write_config(
            &project,
            "server:\n  db_path: project.db\nschedule:\n  department_scoped: true\n",
        );
        write_config(&user, "server:\n  db_path: user.db\n");

        let loader =
            ConfigLoader::load_with_paths(ConfigPaths::with_dirs(Some(project), Some(user)))
                .unwrap();
        let config = loader.config();
        assert_eq!(config.server.db_path, PathBuf::from("user.db"));
        assert!(config.schedule.department_scoped);
    }

    #[test]
    fn relation_types_list_is_replaced_not_appended() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        write_config(
            &project,
            "relations:\n  types:\n    - name: review\n  default_type: review\n",
        );
        let loader =
            ConfigLoader::load_with_paths(ConfigPaths::with_dirs(Some(project), None)).unwrap();
        assert_eq!(loader.config().relations.type_names(), vec!["review"]);
    }

    #[test]
    fn invalid_default_type_fails_load() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        write_config(&project, "relations:\n  default_type: nonsense\n");
        let result = ConfigLoader::load_with_paths(ConfigPaths::with_dirs(Some(project), None));
        assert!(result.is_err());
    }

    #[test]
    fn explicit_file_loads_over_defaults() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("custom.yaml");
        std::fs::write(&file, "schedule:\n  department_scoped: true\n").unwrap();
        let loader = ConfigLoader::load_file(&file).unwrap();
        assert!(loader.config().schedule.department_scoped);
        assert_eq!(loader.config_path(), Some(file.as_path()));

        assert!(ConfigLoader::load_file(&temp.path().join("missing.yaml")).is_err());
    }
}
