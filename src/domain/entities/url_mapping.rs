//! URL mapping entity: the single persisted pair of short code and original URL.

use chrono::{DateTime, Utc};

/// A committed mapping between a short code and the URL it stands for.
///
/// The original URL is stored exactly as the caller supplied it. Two mappings
/// never share a short code, and a URL has at most one mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMapping {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

impl UrlMapping {
    /// Creates a new mapping instance.
    pub fn new(short_code: String, original_url: String, created_at: DateTime<Utc>) -> Self {
        Self {
            short_code,
            original_url,
            created_at,
        }
    }

    /// Returns true if this mapping binds exactly the given pair.
    pub fn binds(&self, original_url: &str, short_code: &str) -> bool {
        self.original_url == original_url && self.short_code == short_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_creation() {
        let now = Utc::now();
        let mapping = UrlMapping::new(
            "abc1234".to_string(),
            "https://example.com".to_string(),
            now,
        );

        assert_eq!(mapping.short_code, "abc1234");
        assert_eq!(mapping.original_url, "https://example.com");
        assert_eq!(mapping.created_at, now);
    }

    #[test]
    fn test_mapping_binds_exact_pair_only() {
        let mapping = UrlMapping::new(
            "abc1234".to_string(),
            "https://example.com".to_string(),
            Utc::now(),
        );

        assert!(mapping.binds("https://example.com", "abc1234"));
        assert!(!mapping.binds("https://example.com", "abc12345"));
        assert!(!mapping.binds("https://example.com/", "abc1234"));
    }
}
