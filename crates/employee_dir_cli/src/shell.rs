//! Menu-driven interaction shell.
//!
//! # Responsibility
//! - Prompt the operator, call directory operations, print results.
//! - Report recoverable failures and keep the session alive.
//!
//! # Invariants
//! - Only storage failures and explicit quit (or end of input) end a session.

use employee_dir_core::db::DbError;
use employee_dir_core::{
    render_employee_summary, render_employee_table, DeleteOutcome, DirectoryService, EmployeeId,
    EmployeePatch, EmployeeRepository, NewEmployee, RepoError, RepoResult,
};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, Write};

const MENU: &str = "Main menu
---------
  1) List employees
  2) Search employees
  3) Add employee
  4) Update employee
  5) Delete employee
  6) Quit

";

/// Failure that ends the session.
#[derive(Debug)]
pub enum ShellError {
    Io(io::Error),
    Storage(RepoError),
}

impl Display for ShellError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "console i/o failed: {err}"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for ShellError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<io::Error> for ShellError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<RepoError> for ShellError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl From<DbError> for ShellError {
    fn from(value: DbError) -> Self {
        Self::Storage(RepoError::Db(value))
    }
}

type ShellResult<T> = Result<T, ShellError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Interactive session over any line-oriented input and output.
pub struct Shell<R: EmployeeRepository, I: BufRead, O: Write> {
    service: DirectoryService<R>,
    input: I,
    output: O,
}

impl<R: EmployeeRepository, I: BufRead, O: Write> Shell<R, I, O> {
    pub fn new(service: DirectoryService<R>, input: I, output: O) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    /// Runs the menu loop until quit, end of input, or a storage failure.
    pub fn run(&mut self) -> ShellResult<()> {
        info!("event=session_start module=cli status=ok");
        write!(self.output, "\nEmployee Directory\n==================\n\n")?;

        loop {
            write!(self.output, "{MENU}")?;
            let Some(choice) = self.prompt("Choose 1-6: ")? else {
                break;
            };

            let flow = match choice.as_str() {
                "1" => self.list_employees()?,
                "2" => self.search_employees()?,
                "3" => self.add_employee()?,
                "4" => self.update_employee()?,
                "5" => self.delete_employee()?,
                other if is_quit(other) => Flow::Quit,
                _ => {
                    write!(self.output, "\n(unrecognized option; try again)\n\n")?;
                    Flow::Continue
                }
            };

            if flow == Flow::Quit {
                break;
            }
        }

        write!(self.output, "\nGoodbye!\n\n")?;
        self.output.flush()?;
        info!("event=session_end module=cli status=ok");
        Ok(())
    }

    fn list_employees(&mut self) -> ShellResult<Flow> {
        write!(self.output, "\nAll employees\n-------------\n")?;
        let result = self.service.list_employees();
        if let Some(employees) = self.recover(result, "list employees")? {
            write!(self.output, "\n{}\n", render_employee_table(&employees))?;
        }
        Ok(Flow::Continue)
    }

    fn search_employees(&mut self) -> ShellResult<Flow> {
        write!(self.output, "\nSearch employees\n----------------\n")?;
        let Some(term) =
            self.prompt("Search by name/email/department/title or an exact ID: ")?
        else {
            return Ok(Flow::Quit);
        };
        if term.is_empty() {
            write!(self.output, "\n(nothing to search)\n\n")?;
            return Ok(Flow::Continue);
        }

        let result = self.service.search_employees(&term);
        if let Some(employees) = self.recover(result, "search employees")? {
            write!(self.output, "\n{}\n", render_employee_table(&employees))?;
        }
        Ok(Flow::Continue)
    }

    fn add_employee(&mut self) -> ShellResult<Flow> {
        write!(self.output, "\nAdd a new employee\n------------------\n")?;
        let Some(first_name) = self.prompt_required("First name: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(last_name) = self.prompt_required("Last name: ")? else {
            return Ok(Flow::Quit);
        };

        let mut draft = NewEmployee::new(first_name, last_name);
        for (label, field) in [
            ("Email (optional): ", &mut draft.email),
            ("Phone (optional): ", &mut draft.phone),
            ("Department (optional): ", &mut draft.department),
            ("Title (optional): ", &mut draft.title),
            ("Hire date (YYYY-MM-DD) [default: today]: ", &mut draft.hire_date),
        ] {
            let Some(value) = self.prompt(label)? else {
                return Ok(Flow::Quit);
            };
            *field = Some(value);
        }

        let result = self.service.add_employee(&draft);
        if let Some(employee) = self.recover(result, "add employee")? {
            write!(self.output, "\nEmployee added (ID {}).\n\n", employee.id)?;
        }
        Ok(Flow::Continue)
    }

    fn update_employee(&mut self) -> ShellResult<Flow> {
        write!(self.output, "\nUpdate an employee\n------------------\n")?;
        let Some(id) = self.prompt_id("Enter the employee ID to update: ")? else {
            return Ok(Flow::Quit);
        };
        let result = self.service.get_employee(id);
        let Some(lookup) = self.recover(result, "look up employee")? else {
            return Ok(Flow::Continue);
        };
        let Some(current) = lookup else {
            write!(self.output, "\n(no employee with that ID)\n\n")?;
            return Ok(Flow::Continue);
        };

        write!(
            self.output,
            "\nPress Enter to keep the current value. Current values in [brackets].\n\n"
        )?;
        let mut patch = EmployeePatch::default();
        for (label, shown, field) in [
            ("First name", Some(current.first_name.as_str()), &mut patch.first_name),
            ("Last name ", Some(current.last_name.as_str()), &mut patch.last_name),
            ("Email     ", current.email.as_deref(), &mut patch.email),
            ("Phone     ", current.phone.as_deref(), &mut patch.phone),
            ("Department", current.department.as_deref(), &mut patch.department),
            ("Title     ", current.title.as_deref(), &mut patch.title),
            ("Hire date ", current.hire_date.as_deref(), &mut patch.hire_date),
        ] {
            let prompt = format!("{label} [{}]: ", shown.unwrap_or(""));
            let Some(value) = self.prompt(&prompt)? else {
                return Ok(Flow::Quit);
            };
            *field = Some(value);
        }

        let result = self.service.update_employee(id, &patch);
        if self.recover(result, "update employee")?.is_some() {
            write!(self.output, "\nEmployee updated.\n\n")?;
        }
        Ok(Flow::Continue)
    }

    fn delete_employee(&mut self) -> ShellResult<Flow> {
        write!(self.output, "\nDelete an employee\n------------------\n")?;
        let Some(id) = self.prompt_id("Enter the employee ID to delete: ")? else {
            return Ok(Flow::Quit);
        };
        let result = self.service.get_employee(id);
        let Some(lookup) = self.recover(result, "look up employee")? else {
            return Ok(Flow::Continue);
        };
        let Some(current) = lookup else {
            write!(self.output, "\n(no employee with that ID)\n\n")?;
            return Ok(Flow::Continue);
        };

        let prompt = format!(
            "Type 'delete' to confirm deleting {}: ",
            render_employee_summary(&current)
        );
        let Some(confirmation) = self.prompt(&prompt)? else {
            return Ok(Flow::Quit);
        };

        let result = self.service.delete_employee(id, &confirmation);
        match self.recover(result, "delete employee")? {
            Some(DeleteOutcome::Deleted(_)) => write!(self.output, "\nEmployee deleted.\n\n")?,
            Some(DeleteOutcome::Cancelled) => write!(self.output, "\n(cancelled)\n\n")?,
            None => {}
        }
        Ok(Flow::Continue)
    }

    /// Prints recoverable failures and passes storage failures up.
    fn recover<T>(&mut self, result: RepoResult<T>, action: &str) -> ShellResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_recoverable() => {
                write!(self.output, "\nCouldn't {action}: {err}\n\n")?;
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Returns the trimmed line, or `None` at end of input.
    fn prompt(&mut self, label: &str) -> ShellResult<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_required(&mut self, label: &str) -> ShellResult<Option<String>> {
        loop {
            match self.prompt(label)? {
                Some(value) if value.is_empty() => {
                    writeln!(self.output, "  (This field is required; try again.)")?;
                }
                other => return Ok(other),
            }
        }
    }

    fn prompt_id(&mut self, label: &str) -> ShellResult<Option<EmployeeId>> {
        loop {
            let Some(raw) = self.prompt(label)? else {
                return Ok(None);
            };
            match raw.parse::<EmployeeId>() {
                Ok(id) => return Ok(Some(id)),
                Err(_) => writeln!(self.output, "  (Please enter a number.)")?,
            }
        }
    }
}

fn is_quit(choice: &str) -> bool {
    choice == "6" || matches!(choice.to_ascii_lowercase().as_str(), "q" | "quit" | "exit")
}

#[cfg(test)]
mod tests {
    use super::Shell;
    use employee_dir_core::db::open_db_in_memory;
    use employee_dir_core::{
        DirectoryService, EmployeeRepository, NewEmployee, SqliteEmployeeRepository,
    };

    fn run_script<R: EmployeeRepository>(repo: R, script: &str) -> String {
        let mut output = Vec::new();
        Shell::new(DirectoryService::new(repo), script.as_bytes(), &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    fn seeded_draft() -> NewEmployee {
        let mut draft = NewEmployee::new("Ada", "Lovelace");
        draft.email = Some("ada@example.com".to_string());
        draft.hire_date = Some("1843-07-01".to_string());
        draft
    }

    #[test]
    fn add_then_list_prints_table() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

        let output = run_script(
            repo,
            "3\nAda\nLovelace\nada@example.com\n\nEngineering\n\n1843-07-01\n1\n6\n",
        );

        assert!(output.contains("Employee added (ID 1)."));
        assert!(output.contains("1    Ada          Lovelace       ada@example.com"));
        assert!(output.ends_with("\nGoodbye!\n\n"));
    }

    #[test]
    fn add_reprompts_for_blank_required_names() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

        let output = run_script(repo, "3\n   \nAda\nLovelace\n\n\n\n\n\nq\n");

        assert_eq!(output.matches("(This field is required; try again.)").count(), 1);
        let stored = SqliteEmployeeRepository::try_new(&conn)
            .unwrap()
            .list_employees()
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].first_name, "Ada");
    }

    #[test]
    fn duplicate_email_is_reported_and_session_continues() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
        repo.create_employee(&seeded_draft()).unwrap();

        let output = run_script(repo, "3\nAugusta\nKing\nada@example.com\n\n\n\n\n1\n6\n");

        assert!(output.contains("Couldn't add employee: constraint violation"));
        assert!(output.contains("Goodbye!"));
        let stored = SqliteEmployeeRepository::try_new(&conn)
            .unwrap()
            .list_employees()
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[test]
    fn update_with_blank_answers_keeps_current_values() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
        let before = repo.create_employee(&seeded_draft()).unwrap();

        let output = run_script(repo, "4\nabc\n1\n\n\n\n\n\n\n\n6\n");

        assert!(output.contains("(Please enter a number.)"));
        assert!(output.contains("Email      [ada@example.com]: "));
        assert!(output.contains("Phone      []: "));
        assert!(output.contains("Employee updated."));
        let after = SqliteEmployeeRepository::try_new(&conn)
            .unwrap()
            .get_employee(1)
            .unwrap()
            .unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn update_and_delete_report_unknown_ids() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

        let output = run_script(repo, "4\n99\n5\n99\n6\n");

        assert_eq!(output.matches("(no employee with that ID)").count(), 2);
    }

    #[test]
    fn delete_requires_typed_confirmation() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
        repo.create_employee(&seeded_draft()).unwrap();

        let output = run_script(repo, "5\n1\nyes\n5\n1\nDELETE\n6\n");

        assert!(output.contains("Type 'delete' to confirm deleting Ada Lovelace (ID 1): "));
        assert!(output.contains("(cancelled)"));
        assert!(output.contains("Employee deleted."));
        let remaining = SqliteEmployeeRepository::try_new(&conn)
            .unwrap()
            .list_employees()
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[test]
    fn search_handles_blank_and_id_terms() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
        repo.create_employee(&seeded_draft()).unwrap();

        let output = run_script(repo, "2\n  \n2\n1\n2\n42\n6\n");

        assert!(output.contains("(nothing to search)"));
        assert!(output.contains("1    Ada"));
        assert!(output.contains("(no employees found)"));
    }

    #[test]
    fn bad_stored_row_is_reported_without_ending_the_session() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO employees (first_name, last_name) VALUES ('', 'Ghost'), ('Ada', 'Lovelace');",
            [],
        )
        .unwrap();
        let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

        let output = run_script(repo, "1\n2\nAda\n4\n1\n6\n");

        assert!(output.contains("Couldn't list employees: invalid persisted employee data"));
        assert!(output.contains("2    Ada          Lovelace"));
        assert!(output.contains("Couldn't look up employee: invalid persisted employee data"));
        assert!(output.ends_with("\nGoodbye!\n\n"));
    }

    #[test]
    fn unknown_choice_and_end_of_input_are_handled() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

        let output = run_script(repo, "9\n");

        assert!(output.contains("(unrecognized option; try again)"));
        assert!(output.ends_with("\nGoodbye!\n\n"));
    }
}
