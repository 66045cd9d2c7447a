//! PostgreSQL store tests. `#[sqlx::test]` creates a fresh database per test
//! from `DATABASE_URL`.

use hashed_url_shortener::application::services::{ShortenerError, ShortenerService};
use hashed_url_shortener::domain::repositories::{StoreError, UrlStore};
use hashed_url_shortener::infrastructure::persistence::PgUrlStore;
use sqlx::PgPool;
use std::sync::Arc;

fn store(pool: PgPool) -> PgUrlStore {
    PgUrlStore::new(Arc::new(pool))
}

#[sqlx::test(migrations = "./migrations")]
async fn test_insert_and_lookup(pool: PgPool) {
    let store = store(pool);

    store.insert("https://x.example", "code001").await.unwrap();

    assert_eq!(
        store.lookup_origin("code001").await.unwrap(),
        "https://x.example"
    );
    assert_eq!(
        store.lookup_short("https://x.example").await.unwrap(),
        "code001"
    );
    assert_eq!(store.count().await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_identical_pair_is_noop(pool: PgPool) {
    let store = store(pool);

    store.insert("https://x.example", "code001").await.unwrap();
    store.insert("https://x.example", "code001").await.unwrap();

    assert_eq!(store.count().await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_code_keeps_first_mapping(pool: PgPool) {
    let store = store(pool);

    store.insert("https://x.example", "code1").await.unwrap();
    let err = store.insert("https://y.example", "code1").await.unwrap_err();

    match err {
        StoreError::DuplicateCode {
            short_code,
            existing_url,
        } => {
            assert_eq!(short_code, "code1");
            assert_eq!(existing_url, "https://x.example");
        }
        other => panic!("expected DuplicateCode, got {other:?}"),
    }
    assert_eq!(
        store.lookup_origin("code1").await.unwrap(),
        "https://x.example"
    );
    assert!(matches!(
        store.lookup_short("https://y.example").await,
        Err(StoreError::NotFound)
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rebinding_retires_stale_code(pool: PgPool) {
    let store = store(pool);

    store.insert("https://x.example", "old-code").await.unwrap();
    store.insert("https://x.example", "new-code").await.unwrap();

    assert!(matches!(
        store.lookup_origin("old-code").await,
        Err(StoreError::NotFound)
    ));
    assert_eq!(
        store.lookup_short("https://x.example").await.unwrap(),
        "new-code"
    );
    assert_eq!(store.count().await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_retired_code_can_be_taken_by_another_url(pool: PgPool) {
    let store = store(pool);

    store.insert("https://x.example", "code-a").await.unwrap();
    store.insert("https://x.example", "code-b").await.unwrap();
    store.insert("https://y.example", "code-a").await.unwrap();

    assert_eq!(
        store.lookup_origin("code-a").await.unwrap(),
        "https://y.example"
    );
    assert_eq!(
        store.lookup_origin("code-b").await.unwrap(),
        "https://x.example"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_insert_new_refuses_to_rebind_url(pool: PgPool) {
    let store = store(pool);

    store.insert_new("https://x.example", "old-code").await.unwrap();
    let err = store
        .insert_new("https://x.example", "new-code")
        .await
        .unwrap_err();

    match err {
        StoreError::OriginBound {
            original_url,
            short_code,
        } => {
            assert_eq!(original_url, "https://x.example");
            assert_eq!(short_code, "old-code");
        }
        other => panic!("expected OriginBound, got {other:?}"),
    }
    assert_eq!(
        store.lookup_origin("old-code").await.unwrap(),
        "https://x.example"
    );
    assert!(matches!(
        store.lookup_origin("new-code").await,
        Err(StoreError::NotFound)
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_insert_new_identical_pair_and_taken_code(pool: PgPool) {
    let store = store(pool);

    store.insert_new("https://x.example", "code1").await.unwrap();
    store.insert_new("https://x.example", "code1").await.unwrap();

    assert!(matches!(
        store.insert_new("https://y.example", "code1").await,
        Err(StoreError::DuplicateCode { ref existing_url, .. }) if existing_url == "https://x.example"
    ));
    assert_eq!(store.count().await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_derived_and_custom_shorten_keep_one_code(pool: PgPool) {
    let service = Arc::new(ShortenerService::new(Arc::new(store(pool.clone()))));

    let derived = {
        let service = service.clone();
        tokio::spawn(async move { service.shorten("https://race.example/alias").await })
    };
    let custom = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .shorten_with_code("https://race.example/alias", "promo")
                .await
        })
    };

    let derived = derived.await.unwrap().unwrap();
    let custom = custom.await.unwrap();
    let committed = store(pool)
        .lookup_short("https://race.example/alias")
        .await
        .unwrap();

    assert_eq!(derived, committed);
    match custom {
        Ok(code) => assert_eq!(code, committed),
        Err(ShortenerError::AlreadyShortened { short_code, .. }) => {
            assert_eq!(short_code, committed)
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_recent_respects_limit(pool: PgPool) {
    let store = store(pool);

    store.insert("https://a.example", "code-a").await.unwrap();
    store.insert("https://b.example", "code-b").await.unwrap();

    let recent = store.list_recent(1).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(store.list_recent(10).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_shorten_agrees_on_one_code(pool: PgPool) {
    let service = Arc::new(ShortenerService::new(Arc::new(store(pool.clone()))));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.shorten("https://race.example/path").await
        }));
    }

    let mut codes = Vec::new();
    for handle in handles {
        codes.push(handle.await.unwrap().unwrap());
    }

    assert!(codes.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(store(pool).count().await.unwrap(), 1);
}
