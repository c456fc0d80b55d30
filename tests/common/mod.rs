//! 集成测试公共工具

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use flare_auth_core::{
    AuthConfig, CacheConfig, CacheService, MemoryStore, SharedStore, TokenService,
    UserStatusSource,
};

/// 计数的用户状态数据源
pub struct CountingSource {
    answer: Result<bool, String>,
    calls: AtomicUsize,
}

impl CountingSource {
    pub fn active() -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(true),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn inactive() -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(false),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            answer: Err("identity service unavailable".to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStatusSource for CountingSource {
    async fn check_status(&self, _user_uid: &str, _real_name: &str) -> anyhow::Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Ok(active) => Ok(*active),
            Err(msg) => Err(anyhow::anyhow!(msg.clone())),
        }
    }
}

/// 测试用的认证环境
pub struct Harness {
    pub cache: CacheService,
    pub store: MemoryStore,
    pub service: TokenService,
}

impl Harness {
    /// 带内存共享存储和数据源的完整环境
    pub fn new(config: AuthConfig, source: Arc<dyn UserStatusSource>) -> Self {
        let cache = CacheService::start(CacheConfig::default());
        let store = MemoryStore::new();
        let shared: Arc<dyn SharedStore> = Arc::new(store.clone());
        let service = TokenService::new(config, &cache)
            .with_store(shared)
            .with_status_source(source);
        Self {
            cache,
            store,
            service,
        }
    }
}
