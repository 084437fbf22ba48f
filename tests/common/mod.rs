// 集成测试共用：本地模拟币安K线接口与图表服务器
#![allow(dead_code)]

use std::net::SocketAddr;
use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

use kline_chart::klcommon::ChartConfig;
use kline_chart::klserver::{serve, AppState};

/// 模拟数据的起始开盘时间：2024-01-01 00:00:00 UTC
pub const BASE_OPEN_TIME: i64 = 1704067200000;

/// 模拟接口拒绝的交易对
pub const UNKNOWN_SYMBOL: &str = "NOPEUSDT";

/// 模拟接口以200返回非JSON多字节文本的交易对
pub const GARBLED_SYMBOL: &str = "GARBLEDUSDT";

/// 非JSON响应体，第1000个字节落在多字节字符内部
pub fn garbled_body() -> String {
    format!("{}{}", "a".repeat(999), "错误页面".repeat(10))
}

#[derive(Debug, Deserialize)]
struct KlineParams {
    symbol: String,
    interval: String,
    limit: usize,
}

async fn mock_klines(Query(params): Query<KlineParams>) -> Response {
    if params.symbol == UNKNOWN_SYMBOL {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"code": -1121, "msg": "Invalid symbol."})),
        )
            .into_response();
    }
    if params.symbol == GARBLED_SYMBOL {
        return (StatusCode::OK, garbled_body()).into_response();
    }
    assert!(!params.interval.is_empty());

    let rows: Vec<serde_json::Value> = (0..params.limit as i64)
        .map(|i| {
            let open_time = BASE_OPEN_TIME + i * 60_000;
            json!([
                open_time,
                "42000.00",
                "42100.00",
                "41900.00",
                format!("{}.5", 42000 + i),
                "10.000",
                open_time + 59_999,
                "420000.00",
                100,
                "5.000",
                "210000.00",
                "0"
            ])
        })
        .collect();

    (StatusCode::OK, Json(json!(rows))).into_response()
}

/// 在随机端口上运行路由
pub async fn spawn_router(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("绑定端口失败");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("模拟服务器异常退出");
    });
    addr
}

/// 启动模拟币安接口，返回其基础URL
pub async fn spawn_mock_binance() -> String {
    let router = Router::new().route("/fapi/v1/klines", get(mock_klines));
    let addr = spawn_router(router).await;
    format!("http://{}", addr)
}

/// 一个当前没有任何服务监听的地址
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// 指向给定行情端点的测试配置
pub fn test_config(api_url: &str) -> ChartConfig {
    let mut config = ChartConfig::default();
    config.server.bind_addr = "127.0.0.1:0".to_string();
    config.server.static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string();
    config.market.api_url = api_url.to_string();
    config.market.request_timeout_secs = 5;
    config.market.connect_timeout_secs = 2;
    config.logging.log_dir = String::new();
    config
}

/// 启动图表服务器，返回其基础URL
pub async fn spawn_chart_server(config: ChartConfig) -> String {
    let state = AppState::new(config).expect("创建服务状态失败");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        serve(listener, state, std::future::pending()).await.expect("图表服务器异常退出");
    });
    format!("http://{}", addr)
}

/// 安装输出到测试捕获的日志订阅者，确保所有日志事件都会被求值
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
