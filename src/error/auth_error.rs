//! 认证子系统统一错误类型

use super::code::ErrorCode;
use super::localized::LocalizedError;
use thiserror::Error;

/// 令牌签发/校验过程中的错误
///
/// 校验类错误（`InvalidToken`、`DestroyedToken`、`UserForbidden`）均为终态，
/// 调用方不应重试；只有 `Store` 属于瞬时的基础设施故障。
#[derive(Error, Debug, Clone)]
pub enum AuthError {
    /// 令牌格式错误、签名不符、已过期、尚未生效或算法不匹配
    #[error("invalid token")]
    InvalidToken,

    /// 令牌已被显式吊销
    #[error("token has been destroyed")]
    DestroyedToken,

    /// 令牌主体当前被禁用
    #[error("user is forbidden")]
    UserForbidden,

    /// 共享存储访问失败
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// 本地签名失败，通常意味着算法与密钥配置不匹配
    #[error("signing error: {0}")]
    Signing(String),
}

impl AuthError {
    /// 创建签名错误
    pub fn signing(msg: impl Into<String>) -> Self {
        AuthError::Signing(msg.into())
    }

    /// 获取错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthError::InvalidToken => ErrorCode::TokenInvalid,
            AuthError::DestroyedToken => ErrorCode::TokenDestroyed,
            AuthError::UserForbidden => ErrorCode::UserForbidden,
            AuthError::Store(_) => ErrorCode::StoreError,
            AuthError::Signing(_) => ErrorCode::SigningFailed,
        }
    }

    /// 是否为令牌校验失败（需对外统一表现为"未认证"）
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken | AuthError::DestroyedToken | AuthError::UserForbidden
        )
    }

    /// 判断是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }

    /// 转换为对外暴露的本地化错误
    ///
    /// 所有校验失败折叠为同一个 `AUTHENTICATION_FAILED`，避免泄露具体原因。
    pub fn to_localized(&self) -> LocalizedError {
        match self {
            err if err.is_verification_failure() => {
                LocalizedError::new(ErrorCode::AuthenticationFailed, "not authenticated")
            }
            AuthError::Store(_) => LocalizedError::new(
                ErrorCode::ServiceUnavailable,
                "authentication service unavailable",
            ),
            _ => LocalizedError::new(ErrorCode::ConfigurationError, "token signing unavailable"),
        }
    }
}

/// 共享存储（Redis 等）错误
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store command failed: {0}")]
    Command(String),

    #[error("store operation timed out after {0}ms")]
    Timeout(u64),

    #[error("store has been closed")]
    Closed,
}

/// 本地缓存错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// 写队列的后台 worker 已停止
    #[error("cache write queue is closed")]
    Closed,
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AuthError>;
