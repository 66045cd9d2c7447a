//! URL store implementations.
//!
//! # Stores
//!
//! - [`MemoryUrlStore`] - Process-local tables behind one lock
//! - [`PgUrlStore`] - PostgreSQL table with uniqueness constraints

pub mod memory_url_store;
pub mod pg_url_store;

pub use memory_url_store::MemoryUrlStore;
pub use pg_url_store::PgUrlStore;
