//! PostgreSQL implementation of the URL store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::entities::UrlMapping;
use crate::domain::repositories::{StoreError, UrlStore};
use crate::utils::db_error::{
    ORIGINAL_URL_CONSTRAINT, SHORT_CODE_CONSTRAINT, is_unique_violation_on,
};

/// Attempts per write when a conflicting row moves between statements.
const WRITE_ATTEMPTS: usize = 3;

/// Outcome of one write attempt.
enum Write {
    Committed,
    /// The row that caused the conflict changed before it could be read back.
    Raced,
}

/// PostgreSQL store over the `urls` table.
///
/// `short_code` is the primary key and `original_url` carries a unique
/// constraint, so the engine itself enforces the bijection. Every write is one
/// statement or one transaction that rolls back if the future is dropped
/// mid-flight.
pub struct PgUrlStore {
    pool: Arc<PgPool>,
}

impl PgUrlStore {
    /// Creates a new store with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn code_owner(&self, short_code: &str) -> Result<Option<String>, StoreError> {
        Ok(
            sqlx::query_scalar::<_, String>("SELECT original_url FROM urls WHERE short_code = $1")
                .bind(short_code)
                .fetch_optional(self.pool.as_ref())
                .await?,
        )
    }

    async fn url_code(&self, original_url: &str) -> Result<Option<String>, StoreError> {
        Ok(
            sqlx::query_scalar::<_, String>("SELECT short_code FROM urls WHERE original_url = $1")
                .bind(original_url)
                .fetch_optional(self.pool.as_ref())
                .await?,
        )
    }

    async fn try_insert(&self, original_url: &str, short_code: &str) -> Result<Write, StoreError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO urls (short_code, original_url)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(short_code)
        .bind(original_url)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 1 {
            tx.commit().await?;
            return Ok(Write::Committed);
        }

        let existing_url: Option<String> =
            sqlx::query_scalar("SELECT original_url FROM urls WHERE short_code = $1")
                .bind(short_code)
                .fetch_optional(&mut *tx)
                .await?;

        match existing_url {
            Some(existing_url) if existing_url == original_url => {
                tx.commit().await?;
                Ok(Write::Committed)
            }
            Some(existing_url) => Err(StoreError::DuplicateCode {
                short_code: short_code.to_string(),
                existing_url,
            }),
            None => {
                // The conflict was on original_url: move that row to the new code.
                debug!(short_code, "retiring stale short code for {}", original_url);

                let rebound = sqlx::query("UPDATE urls SET short_code = $1 WHERE original_url = $2")
                    .bind(short_code)
                    .bind(original_url)
                    .execute(&mut *tx)
                    .await;

                match rebound {
                    Ok(done) if done.rows_affected() == 1 => {
                        tx.commit().await?;
                        Ok(Write::Committed)
                    }
                    Ok(_) => Ok(Write::Raced),
                    Err(e) if is_unique_violation_on(&e, SHORT_CODE_CONSTRAINT) => {
                        drop(tx);
                        match self.code_owner(short_code).await? {
                            Some(existing_url) => Err(StoreError::DuplicateCode {
                                short_code: short_code.to_string(),
                                existing_url,
                            }),
                            None => Ok(Write::Raced),
                        }
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    async fn try_insert_new(
        &self,
        original_url: &str,
        short_code: &str,
    ) -> Result<Write, StoreError> {
        let inserted = sqlx::query("INSERT INTO urls (short_code, original_url) VALUES ($1, $2)")
            .bind(short_code)
            .bind(original_url)
            .execute(self.pool.as_ref())
            .await;

        match inserted {
            Ok(_) => Ok(Write::Committed),
            Err(e) if is_unique_violation_on(&e, SHORT_CODE_CONSTRAINT) => {
                match self.code_owner(short_code).await? {
                    Some(existing_url) if existing_url == original_url => Ok(Write::Committed),
                    Some(existing_url) => Err(StoreError::DuplicateCode {
                        short_code: short_code.to_string(),
                        existing_url,
                    }),
                    None => Ok(Write::Raced),
                }
            }
            Err(e) if is_unique_violation_on(&e, ORIGINAL_URL_CONSTRAINT) => {
                match self.url_code(original_url).await? {
                    Some(existing_code) if existing_code == short_code => Ok(Write::Committed),
                    Some(existing_code) => Err(StoreError::OriginBound {
                        original_url: original_url.to_string(),
                        short_code: existing_code,
                    }),
                    None => Ok(Write::Raced),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Error reported when every attempt raced; the caller treats the code as taken.
    fn contended(short_code: &str) -> StoreError {
        warn!(short_code, "write kept racing with concurrent rebinds");
        StoreError::DuplicateCode {
            short_code: short_code.to_string(),
            existing_url: String::new(),
        }
    }
}

#[async_trait]
impl UrlStore for PgUrlStore {
    async fn insert(&self, original_url: &str, short_code: &str) -> Result<(), StoreError> {
        for _ in 0..WRITE_ATTEMPTS {
            if let Write::Committed = self.try_insert(original_url, short_code).await? {
                return Ok(());
            }
            debug!(short_code, "conflicting row moved, retrying insert");
        }

        Err(Self::contended(short_code))
    }

    async fn insert_new(&self, original_url: &str, short_code: &str) -> Result<(), StoreError> {
        for _ in 0..WRITE_ATTEMPTS {
            if let Write::Committed = self.try_insert_new(original_url, short_code).await? {
                return Ok(());
            }
            debug!(short_code, "conflicting row moved, retrying insert");
        }

        Err(Self::contended(short_code))
    }

    async fn lookup_origin(&self, short_code: &str) -> Result<String, StoreError> {
        self.code_owner(short_code).await?.ok_or(StoreError::NotFound)
    }

    async fn lookup_short(&self, original_url: &str) -> Result<String, StoreError> {
        self.url_code(original_url).await?.ok_or(StoreError::NotFound)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<UrlMapping>, StoreError> {
        let rows: Vec<(String, String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT short_code, original_url, created_at
            FROM urls
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(code, url, created_at)| UrlMapping::new(code, url, created_at))
            .collect())
    }
}
