//! 日志初始化
//!
//! `RUST_LOG` 优先于配置的日志级别。provider 层通过 `log` 输出的日志
//! 由 tracing-subscriber 一并收集。

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 构建日志过滤器
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化全局日志
///
/// 重复调用时保留第一次的设置。
pub fn init_logging(level: &str, json_format: bool) {
    let registry = tracing_subscriber::registry().with(build_filter(level));

    let result = if json_format {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };

    match result {
        Ok(()) => tracing::debug!("Logging initialized (level: {}, json: {})", level, json_format),
        Err(e) => eprintln!("Logging already initialized: {}", e),
    }
}
