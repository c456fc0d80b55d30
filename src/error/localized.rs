//! 对外暴露的错误信息结构

use super::code::{ErrorCategory, ErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 对外暴露的错误信息结构
///
/// 由 `AuthError::to_localized` 生成，只包含可以安全返回给客户端的字段。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizedError {
    /// 错误代码
    pub code: ErrorCode,
    /// 错误原因（用于国际化）
    pub reason: String,
    /// 错误时间戳
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl LocalizedError {
    /// 创建新的本地化错误
    pub fn new(code: ErrorCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// 获取错误代码的数字值
    #[inline]
    pub fn code_value(&self) -> u32 {
        self.code.as_u32()
    }

    /// 获取错误类别
    #[inline]
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// 判断是否为可重试的错误
    #[inline]
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for LocalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.reason)
    }
}
