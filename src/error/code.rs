//! 错误代码和错误类别定义
//!
//! 沿用 flare 的分段编码方式，每个类别占用1000个代码范围：
//! - 2000-2999: 认证相关错误
//! - 6000-6999: 系统相关错误

use serde::{Deserialize, Serialize};
use std::fmt;

/// 认证子系统的错误代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum ErrorCode {
    // ============================================================
    // 认证相关错误 (2000-2999)
    // ============================================================
    AuthenticationFailed = 2000,
    TokenInvalid = 2005,
    TokenDestroyed = 2007,
    UserForbidden = 2008,

    // ============================================================
    // 系统相关错误 (6000-6999)
    // ============================================================
    ServiceUnavailable = 6001,
    ConfigurationError = 6003,
    StoreError = 6005,
    SigningFailed = 6006,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ErrorCode {
    /// 获取错误代码的数字值
    #[inline]
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }

    /// 从数字值创建错误代码
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            2000 => Some(ErrorCode::AuthenticationFailed),
            2005 => Some(ErrorCode::TokenInvalid),
            2007 => Some(ErrorCode::TokenDestroyed),
            2008 => Some(ErrorCode::UserForbidden),
            6001 => Some(ErrorCode::ServiceUnavailable),
            6003 => Some(ErrorCode::ConfigurationError),
            6005 => Some(ErrorCode::StoreError),
            6006 => Some(ErrorCode::SigningFailed),
            _ => None,
        }
    }

    /// 获取错误代码的英文标识符
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AuthenticationFailed => "AUTHENTICATION_FAILED",
            ErrorCode::TokenInvalid => "TOKEN_INVALID",
            ErrorCode::TokenDestroyed => "TOKEN_DESTROYED",
            ErrorCode::UserForbidden => "USER_FORBIDDEN",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorCode::StoreError => "STORE_ERROR",
            ErrorCode::SigningFailed => "SIGNING_FAILED",
        }
    }

    /// 获取错误代码的类别
    pub fn category(&self) -> ErrorCategory {
        match self.as_u32() {
            2000..=2999 => ErrorCategory::Authentication,
            6000..=6999 => ErrorCategory::System,
            _ => ErrorCategory::General,
        }
    }

    /// 判断是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::StoreError | ErrorCode::ServiceUnavailable)
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Authentication,
    System,
    General,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Authentication => write!(f, "AUTHENTICATION"),
            ErrorCategory::System => write!(f, "SYSTEM"),
            ErrorCategory::General => write!(f, "GENERAL"),
        }
    }
}
