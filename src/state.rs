use std::sync::Arc;

use crate::application::services::ShortenerService;
use crate::domain::repositories::UrlStore;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<ShortenerService<dyn UrlStore>>,
    /// Public base URL prepended to short codes in responses.
    pub base_url: String,
}

impl AppState {
    pub fn new(store: Arc<dyn UrlStore>, base_url: impl Into<String>) -> Self {
        Self {
            shortener: Arc::new(ShortenerService::new(store)),
            base_url: base_url.into(),
        }
    }
}
