//! 进程内缓存模块
//!
//! - `LocalCache`: 基于 TTL 的 key/value 缓存，支持 insert-if-absent
//! - `WriteQueue`: 有界异步写队列，单 worker 顺序消费，满时背压
//! - `CacheService`: 组合以上两者，负责后台任务的启动与停止

pub mod local;
pub mod queue;
pub mod service;

pub use local::LocalCache;
pub use queue::{DEFAULT_QUEUE_CAPACITY, QueueWorker, WriteQueue};
pub use service::{CacheConfig, CacheNamespace, CacheService};
