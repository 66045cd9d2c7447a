//! Storage contract for the bidirectional short code / URL mapping.

use crate::domain::entities::UrlMapping;
use async_trait::async_trait;

/// Errors reported by a [`UrlStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested key has no mapping.
    #[error("mapping not found")]
    NotFound,

    /// The short code is already bound to a different URL.
    #[error("short code '{short_code}' already maps to '{existing_url}'")]
    DuplicateCode {
        short_code: String,
        existing_url: String,
    },

    /// The URL is already bound to another code and the write may not rebind it.
    #[error("'{original_url}' is already bound to '{short_code}'")]
    OriginBound {
        original_url: String,
        short_code: String,
    },

    /// The underlying engine failed. Never retried, never reported as `NotFound`.
    #[error("storage backend failure: {0}")]
    Backend(#[from] sqlx::Error),
}

/// Bidirectional mapping between short codes and original URLs.
///
/// Every operation is atomic with respect to every other: no caller ever sees
/// one direction of a pair updated without the other.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryUrlStore`] - process-local tables
/// - [`crate::infrastructure::persistence::PgUrlStore`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlStore: Send + Sync {
    /// Binds `short_code` to `original_url`.
    ///
    /// Inserting a pair that is already stored is a successful no-op. If
    /// `original_url` was bound to another code, that stale binding is retired
    /// in the same atomic step.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateCode`] if `short_code` belongs to a
    /// different URL; the existing mapping is left untouched.
    ///
    /// Returns [`StoreError::Backend`] on database errors.
    async fn insert(&self, original_url: &str, short_code: &str) -> Result<(), StoreError>;

    /// Binds `short_code` to `original_url` only if the URL has no code yet.
    ///
    /// Inserting a pair that is already stored is a successful no-op. Unlike
    /// [`UrlStore::insert`], a URL that is bound to another code is never
    /// rebound, so a code handed out to one caller cannot be retired by another.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateCode`] if `short_code` belongs to a
    /// different URL.
    ///
    /// Returns [`StoreError::OriginBound`] with the committed code if
    /// `original_url` is already bound to a different code.
    ///
    /// Returns [`StoreError::Backend`] on database errors.
    async fn insert_new(&self, original_url: &str, short_code: &str) -> Result<(), StoreError>;

    /// Returns the original URL bound to `short_code`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the code is unknown.
    async fn lookup_origin(&self, short_code: &str) -> Result<String, StoreError>;

    /// Returns the short code bound to `original_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the URL was never shortened.
    async fn lookup_short(&self, original_url: &str) -> Result<String, StoreError>;

    /// Counts stored mappings.
    async fn count(&self) -> Result<u64, StoreError>;

    /// Returns up to `limit` mappings, newest first.
    async fn list_recent(&self, limit: u32) -> Result<Vec<UrlMapping>, StoreError>;
}
