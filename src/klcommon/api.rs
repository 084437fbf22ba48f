use crate::klcommon::{AppError, Kline, MarketConfig, ProxyConfig, Result};
use tracing::{debug, error, warn, info, instrument};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// 币安U本位合约支持的K线周期
pub const SUPPORTED_INTERVALS: &[&str] = &[
    "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w", "1M",
];

/// 日志中响应预览的最大字符数
const RESPONSE_PREVIEW_CHARS: usize = 1000;

/// 截取前 `max_chars` 个字符，切分点总在字符边界上
pub fn text_preview(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(i, _)| &text[..i])
}

/// 是否为币安支持的K线周期
pub fn is_valid_interval(interval: &str) -> bool {
    SUPPORTED_INTERVALS.contains(&interval)
}

/// 币安API客户端
#[derive(Clone, Debug)]
pub struct BinanceApi {
    api_url: String,
    client: Client,
}

impl BinanceApi {
    /// 根据配置创建API客户端
    #[instrument(skip_all, fields(api_url = %market.api_url, use_proxy = proxy.use_proxy))]
    pub fn from_config(market: &MarketConfig, proxy: &ProxyConfig) -> Result<Self> {
        let api_url = market.api_url.trim_end_matches('/').to_string();
        let client = Self::create_client(market, proxy)?;
        info!(target: "api", "🌐 初始化币安API客户端，端点: {}", api_url);
        Ok(Self { api_url, client })
    }

    /// 使用默认超时、不走代理，指向自定义端点
    pub fn new_with_url(api_url: String) -> Result<Self> {
        let market = MarketConfig { api_url, ..MarketConfig::default() };
        Self::from_config(&market, &ProxyConfig::default())
    }

    /// API端点
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// 创建带超时和可选代理的HTTP客户端
    fn create_client(market: &MarketConfig, proxy: &ProxyConfig) -> Result<Client> {
        let client_builder = Client::builder()
            .timeout(Duration::from_secs(market.request_timeout_secs))
            .connect_timeout(Duration::from_secs(market.connect_timeout_secs));

        if !proxy.use_proxy {
            return client_builder
                .build()
                .map_err(|e| AppError::ApiError(format!("创建HTTP客户端失败: {}", e)));
        }

        let proxy_url = proxy.get_url();
        let client = match reqwest::Proxy::all(&proxy_url) {
            Ok(p) => {
                debug!(target: "api", "使用代理创建HTTP客户端: {}", proxy_url);
                client_builder
                    .proxy(p)
                    .build()
                    .map_err(|e| AppError::ApiError(format!("创建带代理的HTTP客户端失败: {}", e)))?
            },
            Err(e) => {
                warn!(target: "api", "设置代理失败，将尝试直接连接: {} - {}", proxy_url, e);
                client_builder
                    .build()
                    .map_err(|e| AppError::ApiError(format!("创建HTTP客户端失败: {}", e)))?
            }
        };

        Ok(client)
    }

    /// 获取U本位合约K线
    ///
    /// 按开盘时间升序返回；格式不符的行会被跳过
    #[instrument(skip(self), err)]
    pub async fn get_klines(&self, symbol: &str, interval: &str, limit: u16) -> Result<Vec<Kline>> {
        let fapi_url = format!("{}/fapi/v1/klines", self.api_url);
        let limit_str = limit.to_string();

        let request = self.client
            .get(&fapi_url)
            .query(&[("symbol", symbol), ("interval", interval), ("limit", limit_str.as_str())]);

        let response = match request.send().await {
            Ok(resp) => {
                tracing::debug!(decision = "http_request_success", symbol = %symbol, interval = %interval, status = %resp.status(), "HTTP请求成功");
                resp
            },
            Err(e) => {
                let http_error = AppError::from(e);
                tracing::error!(
                    message = "HTTP请求失败",
                    symbol = %symbol,
                    interval = %interval,
                    url = %fapi_url,
                    error.summary = http_error.get_error_type_summary(),
                    error.details = %http_error
                );
                return Err(http_error);
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            let api_error = AppError::ApiError(format!(
                "获取 {} 的K线失败: {} - {}",
                symbol, status, text
            ));
            tracing::error!(
                message = "API响应状态错误",
                symbol = %symbol,
                interval = %interval,
                status = %status,
                response_text = %text,
                error.summary = api_error.get_error_type_summary(),
                error.details = %api_error
            );
            return Err(api_error);
        }

        let response_text = response.text().await?;

        let rows: Vec<Vec<Value>> = match serde_json::from_str(&response_text) {
            Ok(rows) => rows,
            Err(e) => {
                let json_error = AppError::JsonError(e);
                error!(
                    target: "api",
                    response_preview = %text_preview(&response_text, RESPONSE_PREVIEW_CHARS),
                    error.summary = json_error.get_error_type_summary(),
                    error.details = %json_error,
                    "解析K线JSON失败"
                );
                return Err(json_error);
            }
        };

        let raw_count = rows.len();
        let klines: Vec<Kline> = rows
            .iter()
            .filter_map(|raw| Kline::from_raw_kline(raw))
            .collect();

        if klines.len() != raw_count {
            warn!(
                target: "api",
                symbol = %symbol,
                raw_count,
                parsed_count = klines.len(),
                "部分K线数据格式不符，已跳过"
            );
        }

        tracing::debug!(decision = "kline_parse_success", symbol = %symbol, interval = %interval, kline_count = klines.len(), "K线数据解析完成");
        Ok(klines)
    }
}
