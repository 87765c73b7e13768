//! Employee record, create draft and update patch.
//!
//! # Invariants
//! - `id` is assigned by storage once and never changes.
//! - `first_name` and `last_name` are never empty or whitespace-only.
//! - Optional text fields are `None` rather than empty strings.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned identifier of an employee row.
pub type EmployeeId = i64;

/// Validation failures for employee input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeValidationError {
    /// A required field is missing or whitespace-only.
    MissingRequiredField(&'static str),
}

impl Display for EmployeeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequiredField(field) => write!(f, "{field} is required"),
        }
    }
}

impl Error for EmployeeValidationError {}

/// One row of the `employees` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub title: Option<String>,
    /// `YYYY-MM-DD`; not format-checked.
    pub hire_date: Option<String>,
}

impl Employee {
    /// Checks required-field invariants.
    pub fn validate(&self) -> Result<(), EmployeeValidationError> {
        require("first_name", &self.first_name)?;
        require("last_name", &self.last_name)?;
        Ok(())
    }
}

/// Input for creating an employee.
///
/// Construct with [`NewEmployee::new`] and set optional fields directly.
/// Blank optional values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub title: Option<String>,
    pub hire_date: Option<String>,
}

impl NewEmployee {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }

    /// Returns a copy with every field trimmed and blank optionals cleared.
    pub fn normalized(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: non_blank(self.email.as_deref()),
            phone: non_blank(self.phone.as_deref()),
            department: non_blank(self.department.as_deref()),
            title: non_blank(self.title.as_deref()),
            hire_date: non_blank(self.hire_date.as_deref()),
        }
    }

    /// Checks required-field invariants on the trimmed values.
    pub fn validate(&self) -> Result<(), EmployeeValidationError> {
        require("first_name", &self.first_name)?;
        require("last_name", &self.last_name)?;
        Ok(())
    }
}

/// Per-field update for an existing employee.
///
/// `None`, empty and whitespace-only values keep the stored value; anything
/// else replaces it (trimmed). There is no way to clear a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub title: Option<String>,
    pub hire_date: Option<String>,
}

impl EmployeePatch {
    /// Returns `true` when applying the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.department,
            &self.title,
            &self.hire_date,
        ]
        .into_iter()
        .all(|value| non_blank(value.as_deref()).is_none())
    }

    /// Produces the updated record; `id` is always carried over.
    pub fn apply_to(&self, current: &Employee) -> Employee {
        Employee {
            id: current.id,
            first_name: replace_or_keep(self.first_name.as_deref(), &current.first_name),
            last_name: replace_or_keep(self.last_name.as_deref(), &current.last_name),
            email: non_blank(self.email.as_deref()).or_else(|| current.email.clone()),
            phone: non_blank(self.phone.as_deref()).or_else(|| current.phone.clone()),
            department: non_blank(self.department.as_deref())
                .or_else(|| current.department.clone()),
            title: non_blank(self.title.as_deref()).or_else(|| current.title.clone()),
            hire_date: non_blank(self.hire_date.as_deref()).or_else(|| current.hire_date.clone()),
        }
    }
}

/// Returns the current local date as `YYYY-MM-DD`.
pub fn today_iso_date() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn require(field: &'static str, value: &str) -> Result<(), EmployeeValidationError> {
    if value.trim().is_empty() {
        return Err(EmployeeValidationError::MissingRequiredField(field));
    }
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

fn replace_or_keep(value: Option<&str>, current: &str) -> String {
    non_blank(value).unwrap_or_else(|| current.to_string())
}
