#![allow(dead_code)]

use async_trait::async_trait;
use hashed_url_shortener::domain::entities::UrlMapping;
use hashed_url_shortener::domain::repositories::{StoreError, UrlStore};
use hashed_url_shortener::infrastructure::persistence::MemoryUrlStore;
use hashed_url_shortener::state::AppState;
use std::sync::Arc;

pub const BASE_URL: &str = "https://s.example.com";

pub fn create_test_state() -> (AppState, Arc<MemoryUrlStore>) {
    let store = Arc::new(MemoryUrlStore::new());
    let state = AppState::new(store.clone(), BASE_URL);

    (state, store)
}

pub fn create_failing_state() -> AppState {
    AppState::new(Arc::new(FailingStore), BASE_URL)
}

/// Store whose every operation fails like an unreachable database.
pub struct FailingStore;

#[async_trait]
impl UrlStore for FailingStore {
    async fn insert(&self, _original_url: &str, _short_code: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }

    async fn insert_new(&self, _original_url: &str, _short_code: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }

    async fn lookup_origin(&self, _short_code: &str) -> Result<String, StoreError> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }

    async fn lookup_short(&self, _original_url: &str) -> Result<String, StoreError> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }

    async fn list_recent(&self, _limit: u32) -> Result<Vec<UrlMapping>, StoreError> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }
}
