//! 用户状态分层缓存集成测试

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::CountingSource;
use flare_auth_core::auth::status::{LOCAL_STATUS_NAMESPACE, UserStatusCache};
use flare_auth_core::{
    AlwaysActive, CacheConfig, CacheNamespace, CacheService, MemoryStore, SharedStore,
    UserStatusSource,
};

struct Fixture {
    cache: CacheService,
    store: MemoryStore,
    status: UserStatusCache,
}

impl Fixture {
    fn new(source: Option<Arc<dyn UserStatusSource>>) -> Self {
        let cache = CacheService::start(CacheConfig::default());
        let store = MemoryStore::new();
        let shared: Arc<dyn SharedStore> = Arc::new(store.clone());
        let mut status =
            UserStatusCache::new(cache.namespace(LOCAL_STATUS_NAMESPACE)).with_store(shared);
        if let Some(source) = source {
            status = status.with_source(source);
        }
        Self {
            cache,
            store,
            status,
        }
    }

    fn local(&self) -> CacheNamespace {
        self.cache.namespace(LOCAL_STATUS_NAMESPACE)
    }
}

#[tokio::test]
async fn test_unknown_user_resolved_by_source_then_cached() {
    let source = CountingSource::active();
    let fixture = Fixture::new(Some(source.clone()));

    assert!(fixture.status.is_active("u-1", "Alice").await);
    assert_eq!(source.calls(), 1);

    // 5 分钟内命中本地缓存，不再回源
    assert!(fixture.status.is_active("u-1", "Alice").await);
    assert_eq!(source.calls(), 1);

    assert_eq!(fixture.local().get("u-1"), Some(serde_json::Value::Bool(true)));
    assert_eq!(fixture.local().get("Alice"), Some(serde_json::Value::Bool(true)));
    assert_eq!(
        fixture.store.get("user-status:u-1").await.unwrap().as_deref(),
        Some("1")
    );
}

#[tokio::test]
async fn test_cached_false_is_always_rechecked() {
    let source = CountingSource::active();
    let fixture = Fixture::new(Some(source.clone()));
    fixture
        .local()
        .set("u-1", false, Duration::from_secs(300));

    assert!(fixture.status.is_active("u-1", "").await);
    assert_eq!(source.calls(), 1);
    assert_eq!(fixture.local().get("u-1"), Some(serde_json::Value::Bool(true)));

    assert!(fixture.status.is_active("u-1", "").await);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_inactive_answer_is_rechecked_every_time() {
    let source = CountingSource::inactive();
    let fixture = Fixture::new(Some(source.clone()));

    assert!(!fixture.status.is_active("u-1", "").await);
    assert!(!fixture.status.is_active("u-1", "").await);
    assert_eq!(source.calls(), 2);
    assert_eq!(
        fixture.store.get("user-status:u-1").await.unwrap().as_deref(),
        Some("0")
    );
}

#[tokio::test]
async fn test_cached_true_skips_source() {
    let source = CountingSource::inactive();
    let fixture = Fixture::new(Some(source.clone()));
    fixture.local().set("u-1", true, Duration::from_secs(300));

    assert!(fixture.status.is_active("u-1", "").await);
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_source_error_fails_closed_without_caching() {
    let source = CountingSource::failing();
    let fixture = Fixture::new(Some(source.clone()));

    assert!(!fixture.status.is_active("u-1", "Alice").await);
    assert_eq!(source.calls(), 1);
    assert!(!fixture.local().contains("u-1"));
    assert!(fixture.store.is_empty());
}

#[tokio::test]
async fn test_non_boolean_local_value_is_ignored() {
    let source = CountingSource::active();
    let fixture = Fixture::new(Some(source.clone()));
    fixture.local().set("u-1", "yes", Duration::from_secs(300));

    assert!(fixture.status.is_active("u-1", "").await);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_shared_tier_hit_skips_source_and_promotes() {
    let source = CountingSource::inactive();
    let fixture = Fixture::new(Some(source.clone()));
    fixture
        .store
        .set("user-status:u-1", "1", Duration::from_secs(60))
        .await
        .unwrap();

    assert!(fixture.status.is_active("u-1", "").await);
    assert_eq!(source.calls(), 0);

    // 异步写队列无读后写保证，轮询等待 worker 处理
    let local = fixture.local();
    let promoted = tokio::time::timeout(Duration::from_secs(2), async {
        while local.get("u-1").is_none() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(promoted.is_ok(), "shared tier hit should be promoted locally");
    assert_eq!(local.get("u-1"), Some(serde_json::Value::Bool(true)));
}

#[tokio::test]
async fn test_shared_false_is_overridden_by_source() {
    let source = CountingSource::active();
    let fixture = Fixture::new(Some(source.clone()));
    fixture
        .store
        .set("user-status:u-1", "0", Duration::from_secs(60))
        .await
        .unwrap();

    assert!(fixture.status.is_active("u-1", "").await);
    assert_eq!(source.calls(), 1);
    assert_eq!(
        fixture.store.get("user-status:u-1").await.unwrap().as_deref(),
        Some("1")
    );
}

#[tokio::test]
async fn test_legacy_boolean_encoding_is_accepted() {
    let fixture = Fixture::new(None);
    fixture
        .store
        .set("user-status:u-1", "true", Duration::from_secs(60))
        .await
        .unwrap();

    assert!(fixture.status.is_active("u-1", "").await);
}

#[tokio::test]
async fn test_miss_without_source_is_inactive() {
    let fixture = Fixture::new(None);

    assert!(!fixture.status.is_active("u-1", "").await);
}

#[tokio::test]
async fn test_store_failure_falls_back_to_source() {
    let source = CountingSource::active();
    let fixture = Fixture::new(Some(source.clone()));
    fixture.store.close().await.unwrap();

    assert!(fixture.status.is_active("u-1", "").await);
    assert_eq!(source.calls(), 1);
    assert_eq!(fixture.local().get("u-1"), Some(serde_json::Value::Bool(true)));
}

#[tokio::test]
async fn test_always_active_and_closure_sources() {
    let fixture = Fixture::new(Some(Arc::new(AlwaysActive)));
    assert!(fixture.status.is_active("u-1", "").await);

    let closure = |user_uid: &str, _real_name: &str| -> anyhow::Result<bool> {
        Ok(user_uid.starts_with("staff-"))
    };
    let fixture = Fixture::new(Some(Arc::new(closure)));
    assert!(fixture.status.is_active("staff-7", "").await);
    assert!(!fixture.status.is_active("guest-7", "").await);
}

#[tokio::test]
async fn test_real_name_entry_shares_uid_key_space() {
    let source = CountingSource::inactive();
    let fixture = Fixture::new(Some(source.clone()));

    // 用户 A 的真实姓名恰好等于用户 B 的 uid
    fixture.status.update_user_status("u-1", "u-2", true).await;

    assert!(fixture.status.is_active("u-2", "").await);
    assert_eq!(source.calls(), 0);
    assert_eq!(fixture.store.get("user-status:u-2").await.unwrap(), None);
}
