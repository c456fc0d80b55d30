//! 进程内 TTL 缓存
//!
//! 条目各自过期：读取时惰性判断，后台清扫任务（见 `CacheService`）定期回收。

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// 缓存中的单个条目
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// 进程内 TTL 缓存
///
/// 克隆开销很小，所有克隆共享同一份数据。值类型默认为 `serde_json::Value`，
/// 以便不同调用方在同一个缓存中存放不同类型的数据，读取方自行判断类型。
#[derive(Clone)]
pub struct LocalCache<V = serde_json::Value> {
    entries: Arc<DashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
}

impl<V: Clone + Send + Sync + 'static> LocalCache<V> {
    /// 创建缓存，`default_ttl` 用于插入时 TTL 为 `Duration::ZERO` 的条目
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            default_ttl,
        }
    }

    fn effective_ttl(&self, ttl: Duration) -> Duration {
        if ttl.is_zero() { self.default_ttl } else { ttl }
    }

    /// 仅当 key 不存在有效条目时写入
    ///
    /// 返回是否写入成功；已存在的有效条目永远不会被覆盖。
    pub fn insert_if_absent(&self, key: impl Into<String>, value: V, ttl: Duration) -> bool {
        let ttl = self.effective_ttl(ttl);
        match self.entries.entry(key.into()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(Instant::now()) {
                    occupied.insert(CacheEntry::new(value, ttl));
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CacheEntry::new(value, ttl));
                true
            }
        }
    }

    /// 无条件写入（覆盖已有条目）
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let ttl = self.effective_ttl(ttl);
        self.entries.insert(key.into(), CacheEntry::new(value, ttl));
    }

    /// 读取未过期的值
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.entries.get(key)?;
        if entry.is_expired(Instant::now()) {
            return None;
        }
        Some(entry.value.clone())
    }

    /// key 是否存在未过期的条目
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// 回收所有已过期的条目，返回回收数量
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// 当前条目数（包含尚未回收的过期条目）
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}
