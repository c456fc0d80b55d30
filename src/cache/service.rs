//! 缓存服务
//!
//! 将本地缓存、异步写队列和过期清扫任务组合在一起，并提供显式的启动/停止生命周期。
//! 服务实例通过构造参数注入到 `TokenService` / `UserStatusCache` 中，
//! 同一进程内可以存在多个互相独立的实例。

use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::local::LocalCache;
use super::queue::{DEFAULT_QUEUE_CAPACITY, WriteQueue};
use crate::error::CacheError;

/// 缓存服务配置
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// 条目默认 TTL（默认 4 小时）
    pub default_ttl: Duration,
    /// 过期条目清扫间隔（默认 30 分钟）
    pub sweep_interval: Duration,
    /// 异步写队列容量（默认 128）
    pub queue_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(4 * 60 * 60),
            sweep_interval: Duration::from_secs(30 * 60),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置默认 TTL
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// 设置清扫间隔
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// 设置写队列容量
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

/// 进程内缓存服务
pub struct CacheService {
    cache: LocalCache,
    queue: WriteQueue,
    shutdown_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl CacheService {
    /// 启动缓存服务（必须在 tokio 运行时内调用）
    ///
    /// 会 spawn 两个后台任务：写队列 worker 和过期清扫任务。
    pub fn start(config: CacheConfig) -> Self {
        let cache = LocalCache::new(config.default_ttl);
        let (queue, worker) = WriteQueue::new(cache.clone(), config.queue_capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker_handle = tokio::spawn(worker.run(shutdown_rx.clone()));
        let sweeper_handle = tokio::spawn(sweep_expired(
            cache.clone(),
            config.sweep_interval,
            shutdown_rx,
        ));

        info!(
            default_ttl_secs = config.default_ttl.as_secs(),
            sweep_interval_secs = config.sweep_interval.as_secs(),
            queue_capacity = config.queue_capacity,
            "local cache service started"
        );

        Self {
            cache,
            queue,
            shutdown_tx,
            tasks: Mutex::new(vec![worker_handle, sweeper_handle]),
        }
    }

    /// 停止后台任务
    ///
    /// 写队列中已提交的条目会先被处理完；之后的异步写入返回 `CacheError::Closed`。
    /// 本地缓存中的数据仍可读取。
    pub async fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        let handles: Vec<JoinHandle<()>> = match self.tasks.lock() {
            Ok(mut tasks) => tasks.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        };
        for handle in handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "cache background task terminated abnormally");
            }
        }
        info!("local cache service stopped");
    }

    /// 获取带前缀的命名空间视图
    pub fn namespace(&self, prefix: impl Into<String>) -> CacheNamespace {
        CacheNamespace {
            prefix: prefix.into(),
            cache: self.cache.clone(),
            queue: self.queue.clone(),
        }
    }

    /// 底层缓存
    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// 底层写队列
    pub fn queue(&self) -> &WriteQueue {
        &self.queue
    }
}

async fn sweep_expired(
    cache: LocalCache,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    // 跳过第一次立即触发的 tick
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let purged = cache.purge_expired();
                if purged > 0 {
                    debug!(purged, remaining = cache.len(), "expired cache entries purged");
                }
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }
}

/// 带前缀的缓存视图
///
/// 不同组件共享同一个物理缓存，通过前缀避免 key 冲突。
#[derive(Clone)]
pub struct CacheNamespace {
    prefix: String,
    cache: LocalCache,
    queue: WriteQueue,
}

impl CacheNamespace {
    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.cache.get(&self.key(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.cache.contains(&self.key(key))
    }

    /// 同步 insert-if-absent
    pub fn insert_if_absent(&self, key: &str, value: impl Into<Value>, ttl: Duration) -> bool {
        self.cache.insert_if_absent(self.key(key), value.into(), ttl)
    }

    /// 同步覆盖写入
    pub fn set(&self, key: &str, value: impl Into<Value>, ttl: Duration) {
        self.cache.set(self.key(key), value.into(), ttl);
    }

    /// 通过异步写队列提交 insert-if-absent
    pub async fn enqueue_insert(
        &self,
        key: &str,
        value: impl Into<Value>,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.queue
            .enqueue_insert(self.key(key), value.into(), ttl)
            .await
    }
}
