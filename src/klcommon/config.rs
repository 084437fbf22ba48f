//! K线图表服务配置模块

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tracing::{info, warn};
use crate::klcommon::{api, AppError, ProxyConfig, Result};

/// 系统配置常量
pub mod constants {
    /// 默认配置文件路径
    pub const DEFAULT_CONFIG_PATH: &str = "config/chart.toml";

    /// 默认监听地址
    pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

    /// 默认币安U本位合约API端点
    pub const DEFAULT_API_URL: &str = "https://fapi.binance.com";

    /// 默认交易对
    pub const DEFAULT_SYMBOL: &str = "BTCUSDT";

    /// 默认K线周期
    pub const DEFAULT_INTERVAL: &str = "1m";

    /// 默认回看K线数量
    pub const DEFAULT_LIMIT: u16 = 50;

    /// 币安单次请求允许的最大K线数量
    pub const MAX_LIMIT: u16 = 1500;
}

use constants::*;

/// K线图表服务配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Web服务器配置
    pub server: ServerConfig,

    /// 行情数据源配置
    pub market: MarketConfig,

    /// 代理配置
    pub proxy: ProxyConfig,

    /// 图表样式
    pub chart: ChartStyle,

    /// 日志配置
    pub logging: LoggingConfig,
}

/// Web服务器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub bind_addr: String,

    /// 静态文件目录（index.html 与 js）
    pub static_dir: String,
}

/// 行情数据源配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// API端点
    pub api_url: String,

    /// 默认交易对
    pub symbol: String,

    /// 默认K线周期
    pub interval: String,

    /// 默认回看K线数量
    pub limit: u16,

    /// 请求超时（秒）
    pub request_timeout_secs: u64,

    /// 连接超时（秒）
    pub connect_timeout_secs: u64,
}

/// 折线图样式，字段与Chart.js的数据集/坐标轴选项一一对应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub label: String,
    pub border_color: String,
    pub background_color: String,
    pub border_width: u32,
    pub x_title: String,
    pub y_title: String,
    /// 服务端渲染的图片宽度
    pub width: u32,
    /// 服务端渲染的图片高度
    pub height: u32,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别，RUST_LOG 环境变量优先
    pub log_level: String,

    /// 日志目录，为空时不写文件
    pub log_dir: String,

    /// 是否输出到控制台
    pub enable_console_output: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            static_dir: "static".to_string(),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            interval: DEFAULT_INTERVAL.to_string(),
            limit: DEFAULT_LIMIT,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            label: "BTC Price (USDT)".to_string(),
            border_color: "rgba(75, 192, 192, 1)".to_string(),
            background_color: "rgba(75, 192, 192, 0.2)".to_string(),
            border_width: 1,
            x_title: "Time".to_string(),
            y_title: "Price (USDT)".to_string(),
            width: 1024,
            height: 600,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "logs".to_string(),
            enable_console_output: true,
        }
    }
}

impl ChartConfig {
    /// 从TOML文件加载配置
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 加载配置；文件不存在时使用默认配置
    ///
    /// 此时日志系统尚未初始化，警告只能走 stderr
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            eprintln!("配置文件 {} 不存在，使用默认配置", path);
            Ok(Self::default())
        }
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::ConfigError(format!("序列化配置失败: {}", e)))?;

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        info!(target: "config", path = %path, "配置已保存");
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;

        url::Url::parse(&self.market.api_url)?;

        validate_market_params(&self.market.symbol, &self.market.interval, self.market.limit)
            .map_err(|e| AppError::ConfigError(e.to_string()))?;

        if self.market.request_timeout_secs == 0 || self.market.connect_timeout_secs == 0 {
            return Err(AppError::ConfigError("超时时间必须大于0".to_string()));
        }

        if self.proxy.use_proxy && self.proxy.port == 0 {
            return Err(AppError::ConfigError("代理端口必须大于0".to_string()));
        }

        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(AppError::ConfigError("图片尺寸必须大于0".to_string()));
        }

        Ok(())
    }

    /// 解析监听地址
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(self.server.bind_addr.parse::<SocketAddr>()?)
    }
}

/// 校验交易对、周期和数量
///
/// 配置加载与HTTP查询参数共用
pub fn validate_market_params(symbol: &str, interval: &str, limit: u16) -> Result<()> {
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::InvalidRequest(format!("无效的交易对: '{}'", symbol)));
    }

    if !api::is_valid_interval(interval) {
        return Err(AppError::InvalidRequest(format!("无效的时间周期: '{}'", interval)));
    }

    if limit == 0 || limit > MAX_LIMIT {
        warn!(target: "config", limit, "K线数量超出范围");
        return Err(AppError::InvalidRequest(format!(
            "K线数量必须在 1..={} 之间，实际为 {}",
            MAX_LIMIT, limit
        )));
    }

    Ok(())
}
