// Web服务器实现
use std::future::Future;
use std::sync::Arc;
use axum::{
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use crate::klcommon::{AppError, BinanceApi, ChartConfig, Result};
use tracing::{info, error};

use super::handlers;

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub api: BinanceApi,
    pub config: Arc<ChartConfig>,
}

impl AppState {
    pub fn new(config: ChartConfig) -> Result<Self> {
        let api = BinanceApi::from_config(&config.market, &config.proxy)?;
        Ok(Self { api, config: Arc::new(config) })
    }
}

/// 创建路由
pub fn build_router(state: AppState) -> Router {
    let static_service = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .route("/", get(handlers::index_handler))
        .route("/btc_data", get(handlers::btc_data_handler))
        .route("/chart_config", get(handlers::chart_config_handler))
        .route("/btc_chart.svg", get(handlers::chart_svg_handler))
        .nest_service("/static", static_service)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 在已绑定的监听器上运行服务，直到 `shutdown` 完成
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    let addr = listener.local_addr()?;
    info!(target: "web", "Web服务器启动在 http://{}", addr);

    match axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
        Ok(_) => {
            info!(target: "web", "Web服务器已关闭");
            Ok(())
        },
        Err(e) => {
            error!(target: "web", "Web服务器错误: {}", e);
            Err(AppError::WebServerError(format!("Web服务器错误: {}", e)))
        }
    }
}

/// 启动Web服务器，收到 Ctrl+C 后优雅退出
pub async fn start_web_server(config: ChartConfig) -> Result<()> {
    let addr = config.socket_addr()?;
    let state = AppState::new(config)?;

    info!(target: "web", "绑定地址: {}", addr);
    let listener = TcpListener::bind(&addr).await
        .map_err(|e| AppError::WebServerError(format!("绑定地址失败: {}", e)))?;

    serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(target: "web", "监听退出信号失败: {}", e);
        }
        info!(target: "web", "收到退出信号，正在关闭Web服务器");
    })
    .await
}
