//! 日志初始化

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::config::LogSettings;

/// 安装全局 tracing subscriber
///
/// `RUST_LOG` 优先于配置中的级别；重复调用返回错误而不是 panic。
pub fn init_tracing(settings: &LogSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|err| anyhow!("invalid log level {}: {err}", settings.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if settings.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
