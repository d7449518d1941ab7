use query_analyzer_cache::{CacheError, SchemaCache, SchemaFetcher, SchemaStore};
use query_analyzer_config::ApiKind;
use query_analyzer_introspect::ApiVersion;
use query_analyzer_schema::SchemaLoadError;
use query_analyzer_test_utils::sdl_to_introspection_string;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const SDL: &str = "type Query { shop: Shop } type Shop { name: String }";

/// Counts fetches and fails the first `failures` of them.
#[derive(Default)]
struct CountingFetcher {
    calls: AtomicUsize,
    failures: usize,
    delay: Duration,
    body: Option<String>,
    versions: Vec<ApiVersion>,
}

impl CountingFetcher {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SchemaFetcher for CountingFetcher {
    async fn fetch(&self, _api: ApiKind, version: &str) -> Result<Vec<u8>, CacheError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if call < self.failures {
            return Err(CacheError::Fetch(format!("boom {version}")));
        }
        Ok(self
            .body
            .clone()
            .unwrap_or_else(|| sdl_to_introspection_string(SDL))
            .into_bytes())
    }

    async fn available_versions(&self, _api: ApiKind) -> Result<Vec<ApiVersion>, CacheError> {
        Ok(self.versions.clone())
    }
}

fn version(handle: &str, supported: bool) -> ApiVersion {
    ApiVersion {
        handle: handle.to_string(),
        display_name: handle.to_string(),
        supported,
    }
}

#[tokio::test]
async fn concurrent_callers_share_one_fetch() {
    let cache = SchemaCache::new(CountingFetcher {
        delay: Duration::from_millis(50),
        ..CountingFetcher::default()
    });

    let results =
        futures::future::join_all((0..8).map(|_| cache.get(ApiKind::Admin, "2025-01", false)))
            .await;

    assert_eq!(cache.fetcher().calls(), 1);
    let first = results[0].as_ref().unwrap();
    for result in &results {
        assert!(Arc::ptr_eq(first, result.as_ref().unwrap()));
    }
}

#[tokio::test]
async fn concurrent_callers_share_one_failure() {
    let cache = SchemaCache::new(CountingFetcher {
        failures: 1,
        delay: Duration::from_millis(50),
        ..CountingFetcher::default()
    });

    let results =
        futures::future::join_all((0..4).map(|_| cache.get(ApiKind::Admin, "2025-01", false)))
            .await;

    assert_eq!(cache.fetcher().calls(), 1);
    for result in results {
        assert_eq!(result.unwrap_err(), CacheError::Fetch("boom 2025-01".to_string()));
    }
}

#[tokio::test]
async fn failure_does_not_poison_the_key() {
    let cache = SchemaCache::new(CountingFetcher {
        failures: 1,
        ..CountingFetcher::default()
    });

    assert!(cache.get(ApiKind::Admin, "2025-01", false).await.is_err());
    let model = cache.get(ApiKind::Admin, "2025-01", false).await.unwrap();
    assert!(model.get("Shop").is_some());
    assert_eq!(cache.fetcher().calls(), 2);
}

#[tokio::test]
async fn keys_are_independent() {
    let cache = SchemaCache::new(CountingFetcher::default());
    let admin = cache.get(ApiKind::Admin, "2025-01", false).await.unwrap();
    let storefront = cache.get(ApiKind::Storefront, "2025-01", false).await.unwrap();
    let older = cache.get(ApiKind::Admin, "2024-10", false).await.unwrap();
    assert!(!Arc::ptr_eq(&admin, &storefront));
    assert!(!Arc::ptr_eq(&admin, &older));
    assert_eq!(cache.fetcher().calls(), 3);
}

#[tokio::test]
async fn memory_hit_and_force_refresh() {
    let cache = SchemaCache::new(CountingFetcher::default());
    let first = cache.get(ApiKind::Admin, "2025-01", false).await.unwrap();
    let second = cache.get(ApiKind::Admin, "2025-01", false).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.fetcher().calls(), 1);

    let refreshed = cache.get(ApiKind::Admin, "2025-01", true).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &refreshed));
    assert_eq!(cache.fetcher().calls(), 2);

    let after = cache.get(ApiKind::Admin, "2025-01", false).await.unwrap();
    assert!(Arc::ptr_eq(&refreshed, &after));
}

#[tokio::test]
async fn schema_load_error_propagates_and_is_not_stored() {
    let dir = tempfile::tempdir().unwrap();
    let store = SchemaStore::new(dir.path());
    let cache = SchemaCache::new(CountingFetcher {
        body: Some(r#"{"data": {}}"#.to_string()),
        ..CountingFetcher::default()
    })
    .with_store(store.clone());

    let err = cache.get(ApiKind::Admin, "2025-01", false).await.unwrap_err();
    assert_eq!(err, CacheError::SchemaLoad(SchemaLoadError::MissingSchema));
    assert!(store.load(ApiKind::Admin, "2025-01").unwrap().is_none());
}

#[tokio::test]
async fn disk_entry_is_used_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let store = SchemaStore::new(dir.path().join("cache"));

    let warm = SchemaCache::new(CountingFetcher::default()).with_store(store.clone());
    warm.get(ApiKind::Admin, "2025-01", false).await.unwrap();
    assert_eq!(warm.fetcher().calls(), 1);
    assert!(store.schema_path(ApiKind::Admin, "2025-01").is_file());
    assert!(store.meta_path(ApiKind::Admin, "2025-01").is_file());

    let cold = SchemaCache::new(CountingFetcher {
        failures: usize::MAX,
        ..CountingFetcher::default()
    })
    .with_store(store.clone());
    let model = cold.get(ApiKind::Admin, "2025-01", false).await.unwrap();
    assert!(model.get("Shop").is_some());
    assert_eq!(cold.fetcher().calls(), 0);

    // A forced refresh skips the disk entry.
    assert!(cold.get(ApiKind::Admin, "2025-01", true).await.is_err());
    assert_eq!(cold.fetcher().calls(), 1);
}

#[tokio::test]
async fn corrupt_disk_entry_is_refetched() {
    let dir = tempfile::tempdir().unwrap();
    let store = SchemaStore::new(dir.path());
    store.save(ApiKind::Admin, "2025-01", b"not json").unwrap();

    let cache = SchemaCache::new(CountingFetcher::default()).with_store(store.clone());
    cache.get(ApiKind::Admin, "2025-01", false).await.unwrap();
    assert_eq!(cache.fetcher().calls(), 1);
    let bytes = store.load(ApiKind::Admin, "2025-01").unwrap().unwrap();
    assert_ne!(bytes, b"not json");
}

#[tokio::test]
async fn resolve_version() {
    let cache = SchemaCache::new(CountingFetcher {
        versions: vec![
            version("unstable", true),
            version("2025-07", false),
            version("2025-04", true),
            version("2025-01", true),
        ],
        ..CountingFetcher::default()
    });

    assert_eq!(cache.resolve_version(ApiKind::Admin, "latest").await.unwrap(), "2025-04");
    assert_eq!(cache.resolve_version(ApiKind::Admin, "unstable").await.unwrap(), "unstable");
    assert_eq!(cache.resolve_version(ApiKind::Admin, "2024-10").await.unwrap(), "2024-10");

    let empty = SchemaCache::new(CountingFetcher::default());
    assert_eq!(
        empty.resolve_version(ApiKind::Admin, "latest").await.unwrap_err(),
        CacheError::Fetch("No supported versions found".to_string())
    );
}
