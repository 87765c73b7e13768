//! Runtime configuration for storage and logging.
//!
//! # Invariants
//! - The storage location is an explicit value handed to the storage engine.
//! - `log_dir` is always absolute.

use crate::db::{open_db, DbResult};
use crate::logging::default_log_level;
use rusqlite::Connection;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the database file location.
pub const DB_PATH_ENV: &str = "EMPLOYEE_DIR_DB";
/// Database file name used when no override is given.
pub const DEFAULT_DB_FILE_NAME: &str = "employees.db";
const LOG_DIR_NAME: &str = "logs";

/// Location of the directory database file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub db_path: PathBuf,
}

impl StorageConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Opens and initializes the configured database.
    pub fn open(&self) -> DbResult<Connection> {
        open_db(&self.db_path)
    }
}

/// Logging level and target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: &'static str,
    pub log_dir: PathBuf,
}

/// Resolved configuration for one process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Resolves configuration from `EMPLOYEE_DIR_DB`, falling back to
    /// `employees.db` beside the running executable.
    pub fn resolve() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_sources(
            std::env::var_os(DB_PATH_ENV),
            std::env::current_exe().ok(),
            &cwd,
        )
    }

    fn from_sources(db_override: Option<OsString>, exe_path: Option<PathBuf>, cwd: &Path) -> Self {
        let db_path = match db_override.filter(|value| !value.is_empty()) {
            Some(value) => PathBuf::from(value),
            None => exe_path
                .as_deref()
                .and_then(Path::parent)
                .map_or_else(|| cwd.to_path_buf(), Path::to_path_buf)
                .join(DEFAULT_DB_FILE_NAME),
        };
        let db_path = if db_path.is_absolute() {
            db_path
        } else {
            cwd.join(db_path)
        };

        let log_dir = db_path
            .parent()
            .map_or_else(|| cwd.to_path_buf(), Path::to_path_buf)
            .join(LOG_DIR_NAME);

        Self {
            storage: StorageConfig::new(db_path),
            logging: LoggingConfig {
                level: default_log_level(),
                log_dir,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, DEFAULT_DB_FILE_NAME};
    use std::ffi::OsString;
    use std::path::PathBuf;

    #[test]
    fn defaults_to_file_beside_executable() {
        let config = AppConfig::from_sources(
            None,
            Some(PathBuf::from("/opt/staff/bin/employee_dir")),
            &PathBuf::from("/home/op"),
        );

        assert_eq!(
            config.storage.db_path,
            PathBuf::from("/opt/staff/bin").join(DEFAULT_DB_FILE_NAME)
        );
        assert_eq!(config.logging.log_dir, PathBuf::from("/opt/staff/bin/logs"));
    }

    #[test]
    fn override_wins_and_relative_paths_are_anchored() {
        let config = AppConfig::from_sources(
            Some(OsString::from("data/staff.db")),
            Some(PathBuf::from("/opt/staff/bin/employee_dir")),
            &PathBuf::from("/home/op"),
        );

        assert_eq!(config.storage.db_path, PathBuf::from("/home/op/data/staff.db"));
        assert_eq!(config.logging.log_dir, PathBuf::from("/home/op/data/logs"));
    }

    #[test]
    fn empty_override_is_ignored() {
        let config = AppConfig::from_sources(Some(OsString::new()), None, &PathBuf::from("/srv"));
        assert_eq!(config.storage.db_path, PathBuf::from("/srv/employees.db"));
    }
}
