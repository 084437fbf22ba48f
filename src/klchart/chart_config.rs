//! Chart.js 形状的折线图配置
//!
//! 序列化结果可以直接交给浏览器端 `new Chart(ctx, config)`，服务端渲染也读取同一结构

use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::klchart::ChartPayload;
use crate::klcommon::ChartStyle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChartConfig {
    #[serde(rename = "type")]
    pub chart_type: String,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub border_color: String,
    pub background_color: String,
    pub border_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    pub scales: Scales,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scales {
    pub x: Axis,
    pub y: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: AxisTitle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTitle {
    pub display: bool,
    pub text: String,
}

impl Axis {
    fn titled(text: &str) -> Self {
        Self {
            title: AxisTitle { display: true, text: text.to_string() },
        }
    }
}

impl LineChartConfig {
    /// 把载荷映射为标签和单个数据集
    ///
    /// 数组原样传递，长度不一致时的表现交给图表库决定
    pub fn from_payload(payload: &ChartPayload, style: &ChartStyle) -> Self {
        if !payload.is_aligned() {
            warn!(
                target: "chart",
                labels = payload.timestamps.len(),
                data = payload.close_prices.len(),
                "时间标签与价格数量不一致"
            );
        }

        Self {
            chart_type: "line".to_string(),
            data: ChartData {
                labels: payload.timestamps.clone(),
                datasets: vec![Dataset {
                    label: style.label.clone(),
                    data: payload.close_prices.clone(),
                    border_color: style.border_color.clone(),
                    background_color: style.background_color.clone(),
                    border_width: style.border_width,
                }],
            },
            options: ChartOptions {
                scales: Scales {
                    x: Axis::titled(&style.x_title),
                    y: Axis::titled(&style.y_title),
                },
            },
        }
    }

    /// 第一个（也是唯一一个）数据集
    pub fn primary_dataset(&self) -> Option<&Dataset> {
        self.data.datasets.first()
    }
}
