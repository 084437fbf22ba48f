//! 日志系统初始化模块
//!
//! 控制台使用人类可读格式，文件日志按天滚动并以JSON输出，便于后续检索

use crate::klcommon::{AppError, LoggingConfig, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// 日志文件名前缀
const LOG_FILE_PREFIX: &str = "kline_chart.log";

/// 组装过滤器字符串，压低第三方库的噪音
pub fn build_filter_directives(log_level: &str) -> String {
    format!("{},hyper=warn,reqwest=warn,tower_http=info", log_level)
}

/// 初始化日志系统
///
/// `RUST_LOG` 环境变量优先于配置中的级别。返回的 guard 必须由 main 持有到退出，
/// 否则文件日志会丢失尾部内容
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<Option<WorkerGuard>> {
    let log_level = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone())
    };
    let filter_str = build_filter_directives(&log_level);

    let console_layer = if config.enable_console_output {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(EnvFilter::new(&filter_str)),
        )
    } else {
        None
    };

    let (file_layer, guard) = if config.log_dir.is_empty() {
        (None, None)
    } else {
        std::fs::create_dir_all(&config.log_dir)?;
        let file_appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_filter(EnvFilter::new(&filter_str));
        (Some(layer), Some(guard))
    };

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::ConfigError(format!("日志系统初始化失败: {}", e)))?;

    Ok(guard)
}
