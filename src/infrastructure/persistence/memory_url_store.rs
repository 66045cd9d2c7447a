//! Process-local implementation of the URL store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::entities::UrlMapping;
use crate::domain::repositories::{StoreError, UrlStore};

/// Both directions of the mapping, always mutated together.
#[derive(Debug, Default)]
struct Tables {
    short_to_origin: HashMap<String, (String, DateTime<Utc>)>,
    origin_to_short: HashMap<String, String>,
}

/// In-memory store guarding both tables with one lock.
///
/// Each call holds the lock for exactly one check-and-write or lookup, and the
/// critical section has no await points, so a cancelled caller cannot leave a
/// half-written pair behind.
#[derive(Debug, Default)]
pub struct MemoryUrlStore {
    tables: RwLock<Tables>,
}

impl MemoryUrlStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-write under one write lock. With `rebind` set, a URL bound to
    /// another code has that stale code retired; otherwise the write is refused.
    async fn write_pair(
        &self,
        original_url: &str,
        short_code: &str,
        rebind: bool,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        if let Some((existing_url, _)) = tables.short_to_origin.get(short_code) {
            if existing_url != original_url {
                return Err(StoreError::DuplicateCode {
                    short_code: short_code.to_string(),
                    existing_url: existing_url.clone(),
                });
            }
            return Ok(());
        }

        if !rebind && let Some(existing_code) = tables.origin_to_short.get(original_url) {
            return Err(StoreError::OriginBound {
                original_url: original_url.to_string(),
                short_code: existing_code.clone(),
            });
        }

        if let Some(stale_code) = tables
            .origin_to_short
            .insert(original_url.to_string(), short_code.to_string())
        {
            tables.short_to_origin.remove(&stale_code);
        }
        tables.short_to_origin.insert(
            short_code.to_string(),
            (original_url.to_string(), Utc::now()),
        );

        Ok(())
    }
}

#[async_trait]
impl UrlStore for MemoryUrlStore {
    async fn insert(&self, original_url: &str, short_code: &str) -> Result<(), StoreError> {
        self.write_pair(original_url, short_code, true).await
    }

    async fn insert_new(&self, original_url: &str, short_code: &str) -> Result<(), StoreError> {
        self.write_pair(original_url, short_code, false).await
    }

    async fn lookup_origin(&self, short_code: &str) -> Result<String, StoreError> {
        self.tables
            .read()
            .await
            .short_to_origin
            .get(short_code)
            .map(|(url, _)| url.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn lookup_short(&self, original_url: &str) -> Result<String, StoreError> {
        self.tables
            .read()
            .await
            .origin_to_short
            .get(original_url)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.tables.read().await.short_to_origin.len() as u64)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<UrlMapping>, StoreError> {
        let tables = self.tables.read().await;

        let mut mappings: Vec<UrlMapping> = tables
            .short_to_origin
            .iter()
            .map(|(code, (url, created_at))| UrlMapping::new(code.clone(), url.clone(), *created_at))
            .collect();
        mappings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        mappings.truncate(limit as usize);

        Ok(mappings)
    }
}
