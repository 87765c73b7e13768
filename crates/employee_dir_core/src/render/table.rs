//! Fixed-width employee table.

use crate::model::employee::Employee;
use std::fmt::Write;

/// Message rendered instead of a table when there are no rows.
pub const NO_RECORDS_MESSAGE: &str = "(no employees found)";

const RULE_WIDTH: usize = 110;

struct Column {
    header: &'static str,
    width: usize,
}

const COLUMNS: [Column; 7] = [
    Column { header: "ID", width: 4 },
    Column { header: "First", width: 12 },
    Column { header: "Last", width: 14 },
    Column { header: "Email", width: 28 },
    Column { header: "Department", width: 14 },
    Column { header: "Title", width: 18 },
    Column { header: "Hired", width: 10 },
];

/// Renders employees as a left-justified fixed-column table.
///
/// Each line ends with `\n`. Absent optional fields render as empty cells
/// and over-long values are not truncated.
pub fn render_employee_table(employees: &[Employee]) -> String {
    if employees.is_empty() {
        return format!("{NO_RECORDS_MESSAGE}\n");
    }

    let mut out = String::new();
    push_line(&mut out, COLUMNS.iter().map(|column| column.header));
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');

    for employee in employees {
        let id = employee.id.to_string();
        let cells = [
            id.as_str(),
            employee.first_name.as_str(),
            employee.last_name.as_str(),
            employee.email.as_deref().unwrap_or(""),
            employee.department.as_deref().unwrap_or(""),
            employee.title.as_deref().unwrap_or(""),
            employee.hire_date.as_deref().unwrap_or(""),
        ];
        push_line(&mut out, cells.into_iter());
    }

    out
}

/// Renders `First Last (ID n)`.
pub fn render_employee_summary(employee: &Employee) -> String {
    format!(
        "{} {} (ID {})",
        employee.first_name, employee.last_name, employee.id
    )
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (index, (cell, column)) in cells.zip(COLUMNS.iter()).enumerate() {
        if index > 0 {
            out.push(' ');
        }
        // Writing to a String cannot fail.
        let _ = write!(out, "{:<width$}", cell, width = column.width);
    }
    out.push('\n');
}
