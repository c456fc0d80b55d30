use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

pub mod memory;
pub mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// 跨进程共享的 key/value 存储接口
///
/// 吊销记录与用户状态都写在这里，多个服务进程共享同一份数据。
/// 所有写入都是独立的幂等 key 写入，不需要事务或 CAS。
#[async_trait]
pub trait SharedStore: Send + Sync {
    /// 写入并设置过期时间（SET key value EX ttl）
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// 读取 key，不存在时返回 `None`
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// 判断 key 是否存在
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// 释放连接，之后的所有操作返回 `StoreError::Closed`
    async fn close(&self) -> Result<(), StoreError>;
}

/// 布尔值的存储编码，与历史数据保持一致（"1" / "0"）
pub fn encode_bool(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// 宽松解析存储中的布尔值
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}
