//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the five directory operations.
//! - Keep the shell decoupled from storage details.

pub mod directory_service;
