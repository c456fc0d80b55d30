//! Flare Auth Core
//!
//! 长期签名令牌的签发与校验、跨进程令牌吊销，以及"用户当前是否可认证"的
//! 分层缓存（进程内缓存 + 共享存储 + 权威数据源二次确认）。

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-exports
pub use auth::{
    AlwaysActive, AuthConfig, MemoryStore, RedisStore, SharedStore, SigningKey, SigningMethod,
    TokenClaims, TokenInfo, TokenService, UserInfo, UserStatusCache, UserStatusSource,
    extract_bearer_token,
};
pub use cache::{CacheConfig, CacheNamespace, CacheService, LocalCache, WriteQueue};
pub use config::Settings;
pub use error::{AuthError, CacheError, ErrorCode, LocalizedError, Result, StoreError};
