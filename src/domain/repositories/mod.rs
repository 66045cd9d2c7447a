//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for testing.
//!
//! # Testing
//!
//! See integration tests in `tests/store_*.rs` for usage examples.

pub mod url_store;

pub use url_store::{StoreError, UrlStore};

#[cfg(test)]
pub use url_store::MockUrlStore;
