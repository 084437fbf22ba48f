use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use crate::klchart::{render_svg_string, ChartPayload, LineChartConfig};
use crate::klcommon::{config::validate_market_params, AppError, MarketConfig, Result};
use super::server::AppState;

/// 图表数据查询参数，缺省时使用配置中的默认值
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub symbol: Option<String>,
    pub interval: Option<String>,
    pub limit: Option<u16>,
}

/// 解析后的行情请求
#[derive(Debug, Clone, PartialEq)]
pub struct MarketRequest {
    pub symbol: String,
    pub interval: String,
    pub limit: u16,
}

impl ChartQuery {
    pub fn resolve(&self, market: &MarketConfig) -> Result<MarketRequest> {
        let symbol = self
            .symbol
            .as_deref()
            .unwrap_or(&market.symbol)
            .trim()
            .to_uppercase();
        let interval = self.interval.clone().unwrap_or_else(|| market.interval.clone());
        let limit = self.limit.unwrap_or(market.limit);

        validate_market_params(&symbol, &interval, limit)?;
        Ok(MarketRequest { symbol, interval, limit })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            e if e.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(
                target: "web",
                status = %status,
                error.summary = self.get_error_type_summary(),
                error.details = %self,
                "请求处理失败"
            );
        } else {
            warn!(target: "web", status = %status, error.details = %self, "请求参数无效");
        }

        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "kind": self.get_error_type_summary(),
        }));
        (status, body).into_response()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// 查询串无法反序列化时同样返回JSON错误体
type ChartQueryParams = std::result::Result<Query<ChartQuery>, QueryRejection>;

/// 拉取K线并转换为图表载荷
async fn load_payload(state: &AppState, query: ChartQueryParams) -> Result<ChartPayload> {
    let Query(query) = query?;
    let req = query.resolve(&state.config.market)?;
    info!(target: "web", symbol = %req.symbol, interval = %req.interval, limit = req.limit, "获取图表数据");

    let klines = state.api.get_klines(&req.symbol, &req.interval, req.limit).await?;
    ChartPayload::from_klines(&klines)
}

/// 首页
pub async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let index_path = std::path::Path::new(&state.config.server.static_dir).join("index.html");
    let index_html = match tokio::fs::read_to_string(&index_path).await {
        Ok(html) => html,
        Err(e) => {
            error!(target: "web", path = %index_path.display(), "读取 index.html 失败: {}", e);
            "<html><body><h1>Error: Could not load index.html</h1></body></html>".to_string()
        }
    };
    Html(index_html)
}

/// 时间标签与收盘价
#[instrument(target = "web", skip_all)]
pub async fn btc_data_handler(
    State(state): State<AppState>,
    query: ChartQueryParams,
) -> Result<Json<ChartPayload>> {
    let payload = load_payload(&state, query).await?;
    Ok(Json(payload))
}

/// 完整的Chart.js折线图配置
#[instrument(target = "web", skip_all)]
pub async fn chart_config_handler(
    State(state): State<AppState>,
    query: ChartQueryParams,
) -> Result<Json<LineChartConfig>> {
    let payload = load_payload(&state, query).await?;
    Ok(Json(LineChartConfig::from_payload(&payload, &state.config.chart)))
}

/// 服务端渲染的SVG
#[instrument(target = "web", skip_all)]
pub async fn chart_svg_handler(
    State(state): State<AppState>,
    query: ChartQueryParams,
) -> Result<Response> {
    let payload = load_payload(&state, query).await?;
    let style = state.config.chart.clone();
    let size = (style.width, style.height);

    // 绘制是同步CPU任务，放到阻塞线程池
    let svg = tokio::task::spawn_blocking(move || {
        let chart = LineChartConfig::from_payload(&payload, &style);
        render_svg_string(&chart, size)
    })
    .await
    .map_err(|e| AppError::WebServerError(format!("渲染任务异常退出: {}", e)))??;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults_from_config() {
        let market = MarketConfig::default();
        let req = ChartQuery::default().resolve(&market).unwrap();
        assert_eq!(
            req,
            MarketRequest { symbol: "BTCUSDT".to_string(), interval: "1m".to_string(), limit: 50 }
        );
    }

    #[test]
    fn test_query_overrides_and_uppercases_symbol() {
        let query = ChartQuery {
            symbol: Some(" ethusdt ".to_string()),
            interval: Some("4h".to_string()),
            limit: Some(500),
        };
        let req = query.resolve(&MarketConfig::default()).unwrap();
        assert_eq!(req.symbol, "ETHUSDT");
        assert_eq!(req.interval, "4h");
        assert_eq!(req.limit, 500);
    }

    #[test]
    fn test_query_rejects_invalid_values() {
        let market = MarketConfig::default();
        let query = ChartQuery { interval: Some("2m".to_string()), ..Default::default() };
        assert!(matches!(query.resolve(&market), Err(AppError::InvalidRequest(_))));

        let query = ChartQuery { limit: Some(0), ..Default::default() };
        assert!(matches!(query.resolve(&market), Err(AppError::InvalidRequest(_))));
    }

    #[test]
    fn test_query_rejection_becomes_invalid_request() {
        let uri: axum::http::Uri = "/btc_data?limit=abc".parse().unwrap();
        let rejection = Query::<ChartQuery>::try_from_uri(&uri).unwrap_err();
        let err = AppError::from(rejection);
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_status_mapping() {
        let resp = AppError::InvalidRequest("bad".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = AppError::ApiError("503".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = AppError::ParseError("close".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
