//! Employee domain model.
//!
//! # Responsibility
//! - Define the fixed-shape record mapped from the `employees` table.
//! - Define the create draft and the per-field update patch.

pub mod employee;
