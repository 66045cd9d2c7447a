//! Utility functions for code derivation and database error handling.
//!
//! - [`code_generator`] - Digest-based short code derivation and validation
//! - [`db_error`] - PostgreSQL unique-violation classification

pub mod code_generator;
pub mod db_error;
