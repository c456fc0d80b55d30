//! 本地缓存异步写队列
//!
//! 有界 FIFO 队列 + 单个后台 worker：worker 按提交顺序执行 insert-if-absent，
//! 因此同一个 key 的两次异步写入总是先提交者生效。队列满时 `enqueue_insert`
//! 会一直等待 worker 腾出空位（背压），不会丢弃写入。

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::debug;

use super::local::LocalCache;
use crate::error::CacheError;

/// 默认队列容量
pub const DEFAULT_QUEUE_CAPACITY: usize = 128;

/// 待写入的缓存条目
#[derive(Debug)]
struct PendingInsert<V> {
    key: String,
    value: V,
    ttl: Duration,
}

/// 写队列的生产端，可自由克隆
pub struct WriteQueue<V = serde_json::Value> {
    tx: mpsc::Sender<PendingInsert<V>>,
}

impl<V> Clone for WriteQueue<V> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// 写队列的消费端，由 `run` 驱动
pub struct QueueWorker<V = serde_json::Value> {
    rx: mpsc::Receiver<PendingInsert<V>>,
    cache: LocalCache<V>,
}

impl<V: Clone + Send + Sync + 'static> WriteQueue<V> {
    /// 创建写队列
    ///
    /// 返回 (WriteQueue, QueueWorker)
    /// - WriteQueue: 提交异步写入
    /// - QueueWorker: 需要被 spawn 才会开始消费；在此之前队列只会被填满
    pub fn new(cache: LocalCache<V>, capacity: usize) -> (Self, QueueWorker<V>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, QueueWorker { rx, cache })
    }

    /// 提交一次 insert-if-absent
    ///
    /// 队列已满时等待空位；worker 已停止时返回 `CacheError::Closed`。
    pub async fn enqueue_insert(
        &self,
        key: impl Into<String>,
        value: V,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let pending = PendingInsert {
            key: key.into(),
            value,
            ttl,
        };
        self.tx.send(pending).await.map_err(|_| CacheError::Closed)
    }

    /// 当前可用的空位数量
    pub fn available(&self) -> usize {
        self.tx.capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<V: Clone + Send + Sync + 'static> QueueWorker<V> {
    /// 消费队列直到所有生产端被释放或收到关闭信号
    ///
    /// 收到关闭信号后不再接受新的写入，但会先处理完已入队的条目。
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                pending = self.rx.recv() => match pending {
                    Some(pending) => self.apply(pending),
                    None => break,
                },
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        self.rx.close();
                        while let Some(pending) = self.rx.recv().await {
                            self.apply(pending);
                        }
                        break;
                    }
                }
            }
        }
        debug!("cache write queue worker stopped");
    }

    fn apply(&self, pending: PendingInsert<V>) {
        if !self
            .cache
            .insert_if_absent(pending.key.as_str(), pending.value, pending.ttl)
        {
            debug!(key = %pending.key, "async insert skipped, live entry exists");
        }
    }
}
