// 导出服务器相关模块
pub mod web;

// 重新导出一些常用类型，方便使用
pub use crate::klcommon::{AppError, BinanceApi, ChartConfig, Result};
pub use self::web::{build_router, serve, start_web_server, AppState};
