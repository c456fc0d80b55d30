use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::SharedStore;
use crate::error::StoreError;

/// 默认单条命令超时
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(3);

/// 基于 Redis 的共享存储
///
/// 使用 `ConnectionManager` 自动重连；每条命令都受 `command_timeout` 约束，
/// 超时以 `StoreError::Timeout` 返回，不做内部重试。
/// `close` 会释放连接（包括后台重连任务），之后所有命令返回 `StoreError::Closed`。
pub struct RedisStore {
    manager: RwLock<Option<ConnectionManager>>,
    namespace: Option<String>,
    command_timeout: Duration,
}

impl RedisStore {
    /// 连接 Redis
    pub async fn connect(url: impl AsRef<str>) -> Result<Self, StoreError> {
        let client = redis::Client::open(url.as_ref())
            .map_err(|err| StoreError::Connection(format!("failed to open redis client: {err}")))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|err| StoreError::Connection(format!("failed to connect redis: {err}")))?;

        info!("redis shared store connected");
        Ok(Self {
            manager: RwLock::new(Some(manager)),
            namespace: None,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        })
    }

    /// 为所有 key 增加前缀（"<namespace>:<key>"），空字符串表示不加前缀
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = (!namespace.is_empty()).then_some(namespace);
        self
    }

    /// 设置单条命令超时
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    fn full_key(&self, key: &str) -> String {
        match self.namespace.as_deref() {
            Some(namespace) => format!("{namespace}:{key}"),
            None => key.to_string(),
        }
    }

    /// 连接是否仍被持有（`close` 之后为 false）
    pub async fn is_connected(&self) -> bool {
        self.manager.read().await.is_some()
    }

    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        self.manager
            .read()
            .await
            .as_ref()
            .cloned()
            .ok_or(StoreError::Closed)
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.command_timeout, fut).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout(self.command_timeout.as_millis() as u64)),
        }
    }
}

#[async_trait]
impl SharedStore for RedisStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let ttl_secs = ttl.as_secs().max(1);
        let key = self.full_key(key);
        self.bounded(conn.set_ex::<_, _, ()>(&key, value, ttl_secs))
            .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        let key = self.full_key(key);
        self.bounded(conn.get::<_, Option<String>>(&key)).await
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;
        let key = self.full_key(key);
        self.bounded(conn.exists::<_, bool>(&key)).await
    }

    async fn close(&self) -> Result<(), StoreError> {
        // 丢弃 manager 即断开连接；正在执行的命令持有各自的克隆，完成后一并释放
        if self.manager.write().await.take().is_some() {
            debug!("redis shared store closed");
        }
        Ok(())
    }
}
