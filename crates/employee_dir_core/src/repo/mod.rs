//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the employee data access contract.
//! - Keep SQL details and constraint mapping out of the service layer.
//!
//! # Invariants
//! - Write paths validate input before SQL mutations.
//! - Each mutation runs in one transaction; failures leave no partial write.
//! - Uniqueness failures surface as `RepoError::ConstraintViolation`.

pub mod employee_repo;
