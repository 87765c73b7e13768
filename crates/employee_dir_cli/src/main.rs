//! Interactive employee directory backed by a local SQLite file.
//!
//! Storage location: `EMPLOYEE_DIR_DB`, or `employees.db` beside the binary.

mod shell;

use employee_dir_core::{init_logging, AppConfig, DirectoryService, SqliteEmployeeRepository};
use log::error;
use shell::{Shell, ShellError};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = AppConfig::resolve();
    if let Err(err) = init_logging(&config.logging) {
        eprintln!("warning: file logging is disabled: {err}");
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=session_end module=cli status=error error={err}");
            eprintln!("\nfatal: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &AppConfig) -> Result<(), ShellError> {
    let conn = config.storage.open()?;
    let repo = SqliteEmployeeRepository::try_new(&conn)?;
    let service = DirectoryService::new(repo);

    let stdin = io::stdin();
    let stdout = io::stdout();
    Shell::new(service, stdin.lock(), stdout.lock()).run()
}
