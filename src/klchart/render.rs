//! 服务端折线图渲染（plotters）
//!
//! X轴为类别轴：横坐标是标签下标，刻度文字取自 `data.labels`

use std::path::Path;
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::{debug, info, instrument};
use crate::klchart::LineChartConfig;
use crate::klcommon::{AppError, Result};

/// 颜色无法解析时使用的默认青色
pub const DEFAULT_LINE_COLOR: RGBAColor = RGBAColor(75, 192, 192, 1.0);

/// Y轴上下留白比例
const Y_PADDING_RATIO: f64 = 0.1;

/// 解析CSS颜色：`rgb(r, g, b)`、`rgba(r, g, b, a)`、`#rrggbb`
pub fn parse_css_color(s: &str) -> Option<RGBAColor> {
    let s = s.trim();

    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some(RGBAColor(r, g, b, 1.0));
    }

    let (body, has_alpha) = if let Some(body) = s.strip_prefix("rgba(") {
        (body, true)
    } else if let Some(body) = s.strip_prefix("rgb(") {
        (body, false)
    } else {
        return None;
    };

    let parts: Vec<&str> = body.strip_suffix(')')?.split(',').map(str::trim).collect();
    if parts.len() != if has_alpha { 4 } else { 3 } {
        return None;
    }

    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;
    let a = if has_alpha {
        parts[3].parse::<f64>().ok()?.clamp(0.0, 1.0)
    } else {
        1.0
    };

    Some(RGBAColor(r, g, b, a))
}

/// 按下标配对的 (标签下标, 价格)，多出的部分丢弃
pub fn paired_points(config: &LineChartConfig) -> Vec<(usize, f64)> {
    let data = match config.primary_dataset() {
        Some(ds) => &ds.data,
        None => return Vec::new(),
    };

    config.data.labels
        .iter()
        .zip(data.iter())
        .enumerate()
        .map(|(i, (_, price))| (i, *price))
        .collect()
}

/// 价格区间加10%留白，区间为0时给一个最小跨度
pub fn y_range(points: &[(usize, f64)]) -> (f64, f64) {
    let min_price = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max_price = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

    let span = (max_price - min_price).max(1e-8);
    let padding = span * Y_PADDING_RATIO;
    ((min_price - padding).max(0.0), max_price + padding)
}

fn render_err<E: std::fmt::Display>(stage: &'static str) -> impl Fn(E) -> AppError {
    move |e| AppError::RenderError(format!("{}: {}", stage, e))
}

fn checked_points(config: &LineChartConfig) -> Result<Vec<(usize, f64)>> {
    let points = paired_points(config);
    if points.is_empty() {
        return Err(AppError::RenderError("没有可绘制的数据点".to_string()));
    }
    Ok(points)
}

fn draw_line_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    config: &LineChartConfig,
    points: &[(usize, f64)],
) -> Result<()> {
    let labels = &config.data.labels;
    let dataset = config
        .primary_dataset()
        .ok_or_else(|| AppError::RenderError("缺少数据集".to_string()))?;

    let (y_min, y_max) = y_range(points);
    let x_max = points.len().saturating_sub(1).max(1);

    let line_color = parse_css_color(&dataset.border_color).unwrap_or(DEFAULT_LINE_COLOR);
    let point_color = parse_css_color(&dataset.background_color).unwrap_or(DEFAULT_LINE_COLOR);

    root.fill(&WHITE).map_err(render_err("填充画布失败"))?;

    let mut chart = ChartBuilder::on(root)
        .caption(dataset.label.as_str(), ("sans-serif", 28.0).into_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0usize..x_max, y_min..y_max)
        .map_err(render_err("构建坐标系失败"))?;

    let label_formatter = |x: &usize| labels.get(*x).cloned().unwrap_or_default();
    chart
        .configure_mesh()
        .x_desc(config.options.scales.x.title.text.as_str())
        .y_desc(config.options.scales.y.title.text.as_str())
        .x_labels(6)
        .x_label_formatter(&label_formatter)
        .draw()
        .map_err(render_err("绘制网格失败"))?;

    chart
        .draw_series(LineSeries::new(
            points.iter().copied(),
            line_color.stroke_width(dataset.border_width.max(1)),
        ))
        .map_err(render_err("绘制折线失败"))?;

    chart
        .draw_series(points.iter().map(|&(x, y)| Circle::new((x, y), 2, point_color.filled())))
        .map_err(render_err("绘制数据点失败"))?;

    root.present().map_err(render_err("输出图像失败"))?;
    Ok(())
}

/// 渲染为SVG字符串
#[instrument(skip(config), err)]
pub fn render_svg_string(config: &LineChartConfig, size: (u32, u32)) -> Result<String> {
    let points = checked_points(config)?;
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, size).into_drawing_area();
        draw_line_chart(&root, config, &points)?;
    }
    debug!(target: "chart", bytes = buf.len(), points = points.len(), "SVG渲染完成");
    Ok(buf)
}

/// 渲染到文件，按扩展名选择 PNG 或 SVG
#[instrument(skip(config, path), fields(path = %path.display()), err)]
pub fn render_to_file(config: &LineChartConfig, path: &Path, size: (u32, u32)) -> Result<()> {
    let points = checked_points(config)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw_line_chart(&root, config, &points)?;
        },
        Some("svg") => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw_line_chart(&root, config, &points)?;
        },
        _ => {
            return Err(AppError::RenderError(format!(
                "不支持的输出格式: {}（仅支持 .png / .svg）",
                path.display()
            )));
        }
    }

    info!(target: "chart", points = points.len(), "图表已写入 {}", path.display());
    Ok(())
}
