use thiserror::Error;
use std::net::AddrParseError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("URL parsing error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Address parse error: {0}")]
    AddrParseError(#[from] AddrParseError),

    #[error("Web server error: {0}")]
    WebServerError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

impl AppError {
    /// 获取错误类型的简洁摘要，用于日志中的错误分类
    ///
    /// 返回稳定的类别字符串，便于按类别聚合错误
    pub fn get_error_type_summary(&self) -> &'static str {
        match self {
            // 行情数据获取
            AppError::ApiError(_) => "kline_data_acquisition_failed",
            AppError::HttpError(_) => "market_data_connection_failed",

            // 行情数据处理
            AppError::JsonError(_) => "kline_data_parsing_failed",
            AppError::ParseError(_) => "market_data_format_invalid",
            AppError::DataError(_) => "kline_data_validation_failed",

            // 请求与配置
            AppError::InvalidRequest(_) => "chart_request_invalid",
            AppError::ConfigError(_) => "chart_service_configuration_invalid",
            AppError::TomlError(_) => "chart_service_configuration_invalid",
            AppError::UrlParseError(_) => "market_endpoint_invalid",
            AppError::AddrParseError(_) => "chart_server_address_invalid",

            // 系统资源
            AppError::IoError(_) => "chart_file_operation_failed",
            AppError::WebServerError(_) => "chart_api_server_failed",

            // 图表绘制
            AppError::RenderError(_) => "chart_render_failed",
        }
    }

    /// 是否为上游（币安或图表服务器）导致的错误
    pub fn is_upstream(&self) -> bool {
        matches!(self, AppError::ApiError(_) | AppError::HttpError(_))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = AppError::ApiError("418 I'm a teapot".to_string());
        assert_eq!(err.get_error_type_summary(), "kline_data_acquisition_failed");
        assert!(err.is_upstream());

        let err = AppError::InvalidRequest("limit".to_string());
        assert_eq!(err.get_error_type_summary(), "chart_request_invalid");
        assert!(!err.is_upstream());
    }

    #[test]
    fn test_from_conversions() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AppError = json_err.into();
        assert!(matches!(err, AppError::JsonError(_)));
        assert!(err.to_string().starts_with("JSON parsing error"));

        let addr_err = "not-an-addr".parse::<std::net::SocketAddr>().unwrap_err();
        let err: AppError = addr_err.into();
        assert_eq!(err.get_error_type_summary(), "chart_server_address_invalid");
    }
}
