//! Core of the employee directory: storage, records, and rendering.
//! The interactive shell lives in the `employee_dir_cli` crate.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod service;

pub use config::{AppConfig, LoggingConfig, StorageConfig};
pub use logging::{default_log_level, init_logging, LoggingError};
pub use model::employee::{
    today_iso_date, Employee, EmployeeId, EmployeePatch, EmployeeValidationError, NewEmployee,
};
pub use render::table::{render_employee_summary, render_employee_table, NO_RECORDS_MESSAGE};
pub use repo::employee_repo::{
    EmployeeRepository, RepoError, RepoResult, SqliteEmployeeRepository,
};
pub use service::directory_service::{
    is_delete_confirmation, DeleteOutcome, DirectoryService, SearchTerm, DELETE_CONFIRMATION,
};

