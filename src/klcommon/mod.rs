// 导出共享模块
pub mod api;
pub mod config;
pub mod error;
pub mod logging_setup;
pub mod models;
pub mod proxy;

// 重新导出常用类型，方便使用
pub use api::BinanceApi;
pub use config::{ChartConfig, ChartStyle, LoggingConfig, MarketConfig, ServerConfig};
pub use error::{AppError, Result};
pub use logging_setup::init_logging;
pub use models::Kline;
pub use proxy::{ProxyConfig, ProxyType};
