// K线图表服务主程序
use std::path::PathBuf;
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use kline_chart::klchart::{render_to_file, ChartClient, ChartPayload, LineChartConfig};
use kline_chart::klcommon::{
    config::constants::DEFAULT_CONFIG_PATH, init_logging, BinanceApi, ChartConfig,
};
use kline_chart::klserver::web::handlers::ChartQuery;
use kline_chart::klserver::start_web_server;

/// 币安U本位合约收盘价折线图
#[derive(Parser, Debug)]
#[command(name = "kline_chart", version, about)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 启动Web服务器
    Serve {
        /// 覆盖配置中的监听地址
        #[arg(long)]
        bind: Option<String>,
    },
    /// 获取数据并渲染为 PNG / SVG 文件
    Render {
        /// 输出文件（.png 或 .svg）
        #[arg(short, long)]
        output: PathBuf,

        /// 图表服务器地址，例如 http://127.0.0.1:5000；省略时直接请求币安
        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        symbol: Option<String>,

        #[arg(long)]
        interval: Option<String>,

        #[arg(long)]
        limit: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ChartConfig::load_or_default(&cli.config)?;
    if let Command::Serve { bind: Some(bind) } = &cli.command {
        config.server.bind_addr = bind.clone();
        config.validate()?;
    }

    let _guard = init_logging(&config.logging, cli.verbose)?;
    info!("Starting kline chart ({})", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Command::Serve { .. } => start_web_server(config).await.map_err(anyhow::Error::from),
        Command::Render { output, source, symbol, interval, limit } => {
            let query = ChartQuery { symbol, interval, limit };
            render(&config, &query, source.as_deref(), &output).await
        }
    };

    if let Err(e) = &result {
        error!("运行失败: {:#}", e);
    }
    result
}

/// 先取数据，再绘图
async fn render(
    config: &ChartConfig,
    query: &ChartQuery,
    source: Option<&str>,
    output: &std::path::Path,
) -> Result<()> {
    let req = query.resolve(&config.market)?;

    let payload = match source {
        Some(base_url) => {
            info!("从图表服务器获取数据: {}", base_url);
            let params = [
                ("symbol", req.symbol.clone()),
                ("interval", req.interval.clone()),
                ("limit", req.limit.to_string()),
            ];
            ChartClient::new(base_url)?.fetch_payload(&params).await?
        },
        None => {
            info!("直接从币安获取 {} {} K线 {} 根", req.symbol, req.interval, req.limit);
            let api = BinanceApi::from_config(&config.market, &config.proxy)?;
            let klines = api.get_klines(&req.symbol, &req.interval, req.limit).await?;
            ChartPayload::from_klines(&klines)?
        }
    };

    let chart = LineChartConfig::from_payload(&payload, &config.chart);
    render_to_file(&chart, output, (config.chart.width, config.chart.height))?;
    info!("已渲染 {} 个数据点到 {}", payload.paired_len(), output.display());
    Ok(())
}
