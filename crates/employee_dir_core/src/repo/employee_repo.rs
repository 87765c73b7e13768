//! Employee repository contract and SQLite implementation.
//!
//! # Invariants
//! - Listing order is `last_name`, `first_name` (case-insensitive), then `id`.
//! - Text search matches substrings literally; `%`, `_` and `\` are escaped.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::employee::{
    today_iso_date, Employee, EmployeeId, EmployeePatch, EmployeeValidationError, NewEmployee,
};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    email,
    phone,
    department,
    title,
    hire_date
FROM employees";

const EMPLOYEE_ORDER_SQL: &str =
    "ORDER BY last_name COLLATE NOCASE, first_name COLLATE NOCASE, id ASC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for employee persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Required input is missing; nothing was written.
    Validation(EmployeeValidationError),
    /// A uniqueness rule was breached; carries the engine's message.
    ConstraintViolation(String),
    NotFound(EmployeeId),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl RepoError {
    /// Returns `true` for failures that should be reported without ending
    /// the session. Only connection and schema failures are fatal; a bad
    /// stored row is reported like any other failed operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::ConstraintViolation(_)
                | Self::NotFound(_)
                | Self::InvalidData(_)
        )
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ConstraintViolation(message) => {
                write!(f, "constraint violation (is the email already used?): {message}")
            }
            Self::NotFound(id) => write!(f, "no employee with id {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted employee data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is older than required {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EmployeeValidationError> for RepoError {
    fn from(value: EmployeeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &value {
            if failure.code == ErrorCode::ConstraintViolation {
                return Self::ConstraintViolation(
                    message.clone().unwrap_or_else(|| failure.to_string()),
                );
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for employee CRUD and search.
pub trait EmployeeRepository {
    /// Inserts a new row; blank `hire_date` defaults to today's local date.
    fn create_employee(&self, draft: &NewEmployee) -> RepoResult<Employee>;
    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    fn list_employees(&self) -> RepoResult<Vec<Employee>>;
    /// Substring match over first/last name, email, department and title.
    fn search_employees(&self, text: &str) -> RepoResult<Vec<Employee>>;
    /// Applies replace-or-keep semantics and returns the stored result.
    fn update_employee(&self, id: EmployeeId, patch: &EmployeePatch) -> RepoResult<Employee>;
    /// Removes the row and returns what was removed.
    fn delete_employee(&self, id: EmployeeId) -> RepoResult<Employee>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    /// Wraps a connection that has already been initialized by `open_db`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is behind.
    /// - `MissingRequiredTable` when `employees` does not exist.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version < expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'employees'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(RepoError::MissingRequiredTable("employees"));
        }

        Ok(Self { conn })
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn create_employee(&self, draft: &NewEmployee) -> RepoResult<Employee> {
        let mut draft = draft.normalized();
        draft.validate()?;
        if draft.hire_date.is_none() {
            draft.hire_date = Some(today_iso_date());
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO employees (
                first_name,
                last_name,
                email,
                phone,
                department,
                title,
                hire_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                draft.first_name,
                draft.last_name,
                draft.email,
                draft.phone,
                draft.department,
                draft.title,
                draft.hire_date,
            ],
        )?;
        let id = tx.last_insert_rowid();
        let created = fetch_employee(&tx, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted employee {id} could not be read back"))
        })?;
        tx.commit()?;

        Ok(created)
    }

    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        fetch_employee(self.conn, id)
    }

    fn list_employees(&self) -> RepoResult<Vec<Employee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} {EMPLOYEE_ORDER_SQL};"))?;
        let mut rows = stmt.query([])?;
        let mut employees = Vec::new();

        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }

        Ok(employees)
    }

    fn search_employees(&self, text: &str) -> RepoResult<Vec<Employee>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "{EMPLOYEE_SELECT_SQL}
             WHERE first_name LIKE ?1 ESCAPE '\\'
                OR last_name LIKE ?1 ESCAPE '\\'
                OR email LIKE ?1 ESCAPE '\\'
                OR department LIKE ?1 ESCAPE '\\'
                OR title LIKE ?1 ESCAPE '\\'
             {EMPLOYEE_ORDER_SQL};"
        ))?;
        let mut rows = stmt.query([like_pattern(text)])?;
        let mut employees = Vec::new();

        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }

        Ok(employees)
    }

    fn update_employee(&self, id: EmployeeId, patch: &EmployeePatch) -> RepoResult<Employee> {
        let tx = self.conn.unchecked_transaction()?;
        let current = fetch_employee(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        if patch.is_empty() {
            return Ok(current);
        }

        let updated = patch.apply_to(&current);
        updated.validate()?;

        tx.execute(
            "UPDATE employees
             SET
                first_name = ?1,
                last_name = ?2,
                email = ?3,
                phone = ?4,
                department = ?5,
                title = ?6,
                hire_date = ?7
             WHERE id = ?8;",
            params![
                updated.first_name,
                updated.last_name,
                updated.email,
                updated.phone,
                updated.department,
                updated.title,
                updated.hire_date,
                id,
            ],
        )?;
        let stored = fetch_employee(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;

        Ok(stored)
    }

    fn delete_employee(&self, id: EmployeeId) -> RepoResult<Employee> {
        let tx = self.conn.unchecked_transaction()?;
        let existing = fetch_employee(&tx, id)?.ok_or(RepoError::NotFound(id))?;

        let changed = tx.execute("DELETE FROM employees WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        tx.commit()?;

        Ok(existing)
    }
}

fn fetch_employee(conn: &Connection, id: EmployeeId) -> RepoResult<Option<Employee>> {
    let mut stmt = conn.prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1;"))?;
    let row = stmt
        .query_row([id], |row| Ok(parse_employee_row(row)))
        .optional()?;
    row.transpose()
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let employee = Employee {
        id: row.get("id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        department: row.get("department")?,
        title: row.get("title")?,
        hire_date: row.get("hire_date")?,
    };
    employee.validate().map_err(|err| {
        RepoError::InvalidData(format!("employees row {}: {err}", employee.id))
    })?;
    Ok(employee)
}

fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
