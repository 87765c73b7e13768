//! Text rendering of query results.
//!
//! Pure functions only; output is byte-for-byte reproducible.

pub mod table;
