//! Conformance checks shared by every backend.
//!
//! Each check panics with a descriptive message on violation, so a backend
//! test is just `assert_contract(&cache).await`.

use crate::fixtures::ResponseFixture;
use respcache_core::{CacheInteractor, Error};

/// A stored value reads back unchanged.
pub async fn assert_round_trip(cache: &dyn CacheInteractor) {
    for (key, value) in [
        ("rt-simple", ResponseFixture::simple()),
        ("rt-headers", ResponseFixture::with_repeated_headers()),
        ("rt-binary", ResponseFixture::binary(4096)),
        ("rt-redirect", ResponseFixture::redirect()),
    ] {
        cache.set(key, &value).await.expect("set");
        let fetched = cache.get(key).await.expect("get");
        assert_eq!(fetched, value, "{} did not round-trip on {}", key, cache.origin());
    }
}

/// Never-set and deleted keys both miss.
pub async fn assert_miss_semantics(cache: &dyn CacheInteractor) {
    assert!(
        matches!(cache.get("miss-never-set").await, Err(Error::CacheMissed)),
        "never-set key must miss"
    );

    cache
        .set("miss-deleted", &ResponseFixture::simple())
        .await
        .expect("set");
    cache.delete("miss-deleted").await.expect("delete");
    assert!(
        matches!(cache.get("miss-deleted").await, Err(Error::CacheMissed)),
        "deleted key must miss"
    );
}

/// Deleting twice, or deleting what was never there, is not an error.
pub async fn assert_idempotent_delete(cache: &dyn CacheInteractor) {
    cache.delete("idem-never-set").await.expect("delete missing");

    cache
        .set("idem", &ResponseFixture::simple())
        .await
        .expect("set");
    cache.delete("idem").await.expect("first delete");
    cache.delete("idem").await.expect("second delete");
}

/// A later set replaces the earlier value entirely.
pub async fn assert_overwrite(cache: &dyn CacheInteractor) {
    cache
        .set("overwrite", &ResponseFixture::with_repeated_headers())
        .await
        .expect("first set");
    cache
        .set("overwrite", &ResponseFixture::redirect())
        .await
        .expect("second set");

    assert_eq!(
        cache.get("overwrite").await.expect("get"),
        ResponseFixture::redirect()
    );
}

/// Flush removes every key that was set.
pub async fn assert_flush(cache: &dyn CacheInteractor, count: usize) {
    let keys: Vec<String> = (0..count).map(|i| format!("flush-{}", i)).collect();
    for (i, key) in keys.iter().enumerate() {
        cache
            .set(key, &ResponseFixture::numbered(i))
            .await
            .expect("set");
    }

    cache.flush().await.expect("flush");

    for key in &keys {
        assert!(
            matches!(cache.get(key).await, Err(Error::CacheMissed)),
            "{} survived flush",
            key
        );
    }
}

/// The worked scenario: set `a`, read it, delete it, miss.
pub async fn assert_basic_scenario(cache: &dyn CacheInteractor) {
    let value = ResponseFixture::simple();
    cache.set("a", &value).await.expect("set a");

    let fetched = cache.get("a").await.expect("get a");
    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.header_values("X"), Some(&["1".to_string()][..]));
    assert_eq!(fetched.body, b"hi");

    cache.delete("a").await.expect("delete a");
    assert!(cache.get("a").await.unwrap_err().is_cache_missed());
}

/// Run every conformance check. Leaves the backend flushed.
pub async fn assert_contract(cache: &dyn CacheInteractor) {
    assert_basic_scenario(cache).await;
    assert_round_trip(cache).await;
    assert_miss_semantics(cache).await;
    assert_idempotent_delete(cache).await;
    assert_overwrite(cache).await;
    assert_flush(cache, 5).await;
}
