// 图表相关模块：数据载荷、Chart.js配置、服务端渲染与数据客户端
pub mod chart_config;
pub mod client;
pub mod payload;
pub mod render;

pub use chart_config::LineChartConfig;
pub use client::ChartClient;
pub use payload::ChartPayload;
pub use render::{render_svg_string, render_to_file};
