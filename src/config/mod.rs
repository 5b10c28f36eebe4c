//! Configuration with field-by-field YAML merging across tiers:
//! 1. **Defaults** - `Config::default()`
//! 2. **Project** - `$CWD/crm-schedule/config.yaml`
//! 3. **User** - `~/.crm-schedule/config.yaml`
//! 4. **Environment** - variables below
//!
//! ## Environment Variables
//! - `CRM_SCHEDULE_CONFIG_PATH` - Explicit config file (replaces the project and user tiers)
//! - `CRM_SCHEDULE_DB_PATH` - Database path
//! - `CRM_SCHEDULE_USER_DIR` - User config dir (default: `~/.crm-schedule`)
//! - `CRM_SCHEDULE_PROJECT_DIR` - Project config dir (default: `./crm-schedule`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
