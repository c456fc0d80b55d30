//! Flare Auth Core 错误处理模块
//!
//! 提供认证子系统的错误分类、错误代码以及对外暴露时的统一表现形式

pub mod auth_error;
pub mod code;
pub mod conversions;
pub mod localized;

// 重新导出公共类型
pub use auth_error::{AuthError, CacheError, Result, StoreError};
pub use code::{ErrorCategory, ErrorCode};
pub use localized::LocalizedError;
