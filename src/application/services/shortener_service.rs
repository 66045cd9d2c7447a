//! Short code derivation, persistence and resolution.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::repositories::{StoreError, UrlStore};
use crate::utils::code_generator::{CodeCandidates, CodeValidationError, validate_custom_code};

/// Errors surfaced by [`ShortenerService`].
#[derive(Debug, thiserror::Error)]
pub enum ShortenerError {
    /// No mapping exists for the requested code.
    #[error("no mapping for short code '{short_code}'")]
    NotFound { short_code: String },

    /// The requested code is bound to a different URL.
    #[error("short code '{short_code}' already maps to '{existing_url}'")]
    DuplicateOriginConflict {
        short_code: String,
        existing_url: String,
    },

    /// The URL already has a committed code different from the requested one.
    #[error("'{original_url}' is already shortened as '{short_code}'")]
    AlreadyShortened {
        original_url: String,
        short_code: String,
    },

    /// Every length of the ladder collided with another URL.
    #[error("failed to generate a unique short code for '{original_url}' after {attempts} attempts")]
    GenerationExhausted {
        original_url: String,
        attempts: usize,
    },

    #[error(transparent)]
    InvalidCode(#[from] CodeValidationError),

    /// The store failed; never retried here.
    #[error("storage backend failure")]
    Backend(#[source] StoreError),
}

/// Service turning URLs into stable short codes and back.
///
/// Holds no mutable state of its own; all mapping state lives in the store,
/// so one instance is shared by every request handler.
pub struct ShortenerService<S: UrlStore + ?Sized> {
    store: Arc<S>,
}

impl<S: UrlStore + ?Sized> ShortenerService<S> {
    /// Creates a new shortener over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the short code for `original_url`, creating it on first use.
    ///
    /// # Algorithm
    ///
    /// 1. If the URL already has a code, return it without hashing or writing.
    /// 2. Derive candidates from the SHA-256 digest of the URL.
    /// 3. Insert the 7-character candidate, widening up to 10 characters on
    ///    each collision with a different URL. The write never rebinds the
    ///    URL: if a concurrent caller bound it first, that code is returned.
    /// 4. When the ladder is exhausted, look the URL up once more: a concurrent
    ///    writer may have committed it in the meantime.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::GenerationExhausted`] if every candidate
    /// collides and the URL is still unmapped.
    ///
    /// Returns [`ShortenerError::Backend`] as soon as the store fails.
    pub async fn shorten(&self, original_url: &str) -> Result<String, ShortenerError> {
        if let Some(existing) = self.find_short(original_url).await? {
            debug!(short_code = %existing, "URL already shortened");
            return Ok(existing);
        }

        let candidates = CodeCandidates::derive(original_url);
        let mut attempts = 0;

        for (length, candidate) in candidates.iter() {
            attempts += 1;

            match self.store.insert_new(original_url, candidate).await {
                Ok(()) => {
                    info!(short_code = candidate, length, "Short code created");
                    return Ok(candidate.to_string());
                }
                Err(StoreError::OriginBound { short_code, .. }) => {
                    debug!(short_code = %short_code, "URL committed concurrently");
                    return Ok(short_code);
                }
                Err(StoreError::DuplicateCode { existing_url, .. })
                    if existing_url == original_url =>
                {
                    debug!(short_code = candidate, "Short code committed concurrently");
                    return Ok(candidate.to_string());
                }
                Err(StoreError::DuplicateCode { existing_url, .. }) => {
                    warn!(
                        short_code = candidate,
                        length,
                        existing_url = %existing_url,
                        "Short code collision, trying a longer code"
                    );
                }
                Err(e) => return Err(ShortenerError::Backend(e)),
            }
        }

        if let Some(existing) = self.find_short(original_url).await? {
            debug!(short_code = %existing, "URL committed concurrently after collisions");
            return Ok(existing);
        }

        Err(ShortenerError::GenerationExhausted {
            original_url: original_url.to_string(),
            attempts,
        })
    }

    /// Binds `original_url` to a caller-chosen code.
    ///
    /// Repeating the same request returns the same code. A URL that already
    /// has a different code is never rebound, even when that code was
    /// committed concurrently after the initial lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::InvalidCode`] if the code fails validation.
    /// Returns [`ShortenerError::AlreadyShortened`] if the URL has another code.
    /// Returns [`ShortenerError::DuplicateOriginConflict`] if the code is taken.
    pub async fn shorten_with_code(
        &self,
        original_url: &str,
        custom_code: &str,
    ) -> Result<String, ShortenerError> {
        validate_custom_code(custom_code)?;

        if let Some(existing) = self.find_short(original_url).await? {
            if existing == custom_code {
                return Ok(existing);
            }
            return Err(ShortenerError::AlreadyShortened {
                original_url: original_url.to_string(),
                short_code: existing,
            });
        }

        match self.store.insert_new(original_url, custom_code).await {
            Ok(()) => {
                info!(short_code = custom_code, "Custom short code created");
                Ok(custom_code.to_string())
            }
            Err(StoreError::OriginBound { short_code, .. }) if short_code == custom_code => {
                Ok(short_code)
            }
            Err(StoreError::OriginBound {
                original_url,
                short_code,
            }) => Err(ShortenerError::AlreadyShortened {
                original_url,
                short_code,
            }),
            Err(StoreError::DuplicateCode {
                short_code,
                existing_url,
            }) => Err(ShortenerError::DuplicateOriginConflict {
                short_code,
                existing_url,
            }),
            Err(e) => Err(ShortenerError::Backend(e)),
        }
    }

    /// Returns the original URL for `short_code`.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::NotFound`] if the code is unknown.
    /// Returns [`ShortenerError::Backend`] on store failures.
    pub async fn resolve(&self, short_code: &str) -> Result<String, ShortenerError> {
        match self.store.lookup_origin(short_code).await {
            Ok(url) => Ok(url),
            Err(StoreError::NotFound) => Err(ShortenerError::NotFound {
                short_code: short_code.to_string(),
            }),
            Err(e) => Err(ShortenerError::Backend(e)),
        }
    }

    /// Constructs the public short URL from a base URL and code.
    pub fn short_url(&self, base_url: &str, code: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), code)
    }

    async fn find_short(&self, original_url: &str) -> Result<Option<String>, ShortenerError> {
        match self.store.lookup_short(original_url).await {
            Ok(code) => Ok(Some(code)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(ShortenerError::Backend(e)),
        }
    }
}
