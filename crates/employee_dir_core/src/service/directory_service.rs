//! Employee directory use-case service.
//!
//! # Responsibility
//! - Expose Create/List/Search/Update/Delete entry points for the shell.
//! - Classify search input and enforce the delete confirmation rule.
//!
//! # Invariants
//! - Blank search terms never reach storage.
//! - Delete never removes a row without the `delete` confirmation token.
//! - Logged events carry ids and counts only, never names or emails.

use crate::model::employee::{Employee, EmployeeId, EmployeePatch, NewEmployee};
use crate::repo::employee_repo::{EmployeeRepository, RepoError, RepoResult};
use log::{info, warn};

/// Token that confirms a delete, compared case-insensitively.
pub const DELETE_CONFIRMATION: &str = "delete";

/// Classified search input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    /// Blank input; nothing is queried.
    Empty,
    /// All-digit input; exact id lookup.
    Id(EmployeeId),
    /// All-digit input beyond the id range; matches nothing.
    OutOfRangeId,
    /// Anything else; substring match over text columns.
    Text(String),
}

impl SearchTerm {
    pub fn parse(raw: &str) -> Self {
        let term = raw.trim();
        if term.is_empty() {
            return Self::Empty;
        }
        if term.bytes().all(|byte| byte.is_ascii_digit()) {
            return match term.parse::<EmployeeId>() {
                Ok(id) => Self::Id(id),
                Err(_) => Self::OutOfRangeId,
            };
        }
        Self::Text(term.to_string())
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(Employee),
    /// Confirmation was not given; nothing changed.
    Cancelled,
}

/// Returns whether `input` confirms a delete.
pub fn is_delete_confirmation(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(DELETE_CONFIRMATION)
}

/// Use-case service wrapper for directory operations.
pub struct DirectoryService<R: EmployeeRepository> {
    repo: R,
}

impl<R: EmployeeRepository> DirectoryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds an employee.
    ///
    /// # Errors
    /// - `Validation` when a name is blank.
    /// - `ConstraintViolation` when the email is already used.
    pub fn add_employee(&self, draft: &NewEmployee) -> RepoResult<Employee> {
        match self.repo.create_employee(draft) {
            Ok(employee) => {
                info!(
                    "event=employee_create module=service status=ok id={}",
                    employee.id
                );
                Ok(employee)
            }
            Err(err) => Err(log_failure("employee_create", None, err)),
        }
    }

    /// Lists every employee sorted by last then first name.
    pub fn list_employees(&self) -> RepoResult<Vec<Employee>> {
        self.repo.list_employees()
    }

    /// Searches by exact id (all-digit terms) or by substring.
    pub fn search_employees(&self, raw_term: &str) -> RepoResult<Vec<Employee>> {
        match SearchTerm::parse(raw_term) {
            SearchTerm::Empty | SearchTerm::OutOfRangeId => Ok(Vec::new()),
            SearchTerm::Id(id) => Ok(self.repo.get_employee(id)?.into_iter().collect()),
            SearchTerm::Text(text) => self.repo.search_employees(&text),
        }
    }

    /// Gets one employee by id.
    pub fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        self.repo.get_employee(id)
    }

    /// Updates an employee with replace-or-keep semantics.
    ///
    /// # Errors
    /// - `NotFound` when `id` does not exist.
    /// - `ConstraintViolation` when the new email is already used.
    pub fn update_employee(&self, id: EmployeeId, patch: &EmployeePatch) -> RepoResult<Employee> {
        match self.repo.update_employee(id, patch) {
            Ok(employee) => {
                info!(
                    "event=employee_update module=service status=ok id={} changed={}",
                    id,
                    !patch.is_empty()
                );
                Ok(employee)
            }
            Err(err) => Err(log_failure("employee_update", Some(id), err)),
        }
    }

    /// Deletes an employee when `confirmation` equals `delete`.
    ///
    /// # Errors
    /// - `NotFound` when `id` does not exist, regardless of confirmation.
    pub fn delete_employee(&self, id: EmployeeId, confirmation: &str) -> RepoResult<DeleteOutcome> {
        if self.repo.get_employee(id)?.is_none() {
            return Err(log_failure("employee_delete", Some(id), RepoError::NotFound(id)));
        }

        if !is_delete_confirmation(confirmation) {
            info!("event=employee_delete module=service status=cancelled id={id}");
            return Ok(DeleteOutcome::Cancelled);
        }

        match self.repo.delete_employee(id) {
            Ok(employee) => {
                info!("event=employee_delete module=service status=ok id={id}");
                Ok(DeleteOutcome::Deleted(employee))
            }
            Err(err) => Err(log_failure("employee_delete", Some(id), err)),
        }
    }
}

fn log_failure(event: &str, id: Option<EmployeeId>, err: RepoError) -> RepoError {
    let id = id.map_or_else(|| "-".to_string(), |id| id.to_string());
    let error_code = match &err {
        RepoError::Validation(_) => "validation",
        RepoError::ConstraintViolation(_) => "constraint_violation",
        RepoError::NotFound(_) => "not_found",
        RepoError::InvalidData(_) => "invalid_data",
        _ => "storage",
    };
    warn!("event={event} module=service status=error id={id} error_code={error_code}");
    err
}

#[cfg(test)]
mod tests {
    use super::{is_delete_confirmation, SearchTerm};

    #[test]
    fn search_term_classifies_input() {
        assert_eq!(SearchTerm::parse("   "), SearchTerm::Empty);
        assert_eq!(SearchTerm::parse(" 42 "), SearchTerm::Id(42));
        assert_eq!(SearchTerm::parse("007"), SearchTerm::Id(7));
        assert_eq!(
            SearchTerm::parse("99999999999999999999999"),
            SearchTerm::OutOfRangeId
        );
        assert_eq!(SearchTerm::parse("-3"), SearchTerm::Text("-3".to_string()));
        assert_eq!(
            SearchTerm::parse("\u{663}\u{664}"),
            SearchTerm::Text("\u{663}\u{664}".to_string())
        );
        assert_eq!(
            SearchTerm::parse(" Eng 2 "),
            SearchTerm::Text("Eng 2".to_string())
        );
    }

    #[test]
    fn confirmation_is_case_insensitive_and_exact() {
        assert!(is_delete_confirmation("delete"));
        assert!(is_delete_confirmation(" DeLeTe\n"));
        assert!(!is_delete_confirmation("y"));
        assert!(!is_delete_confirmation("deleted"));
        assert!(!is_delete_confirmation(""));
    }
}
