use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::klcommon::{AppError, Result};

/// 图表标签使用的时间格式（UTC）
pub const TIMESTAMP_LABEL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 表示币安K线/蜡烛图
///
/// 价格与成交量保持币安返回的字符串形式，需要时再解析
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    /// K线开盘时间（毫秒）
    pub open_time: i64,
    /// 开盘价
    pub open: String,
    /// 最高价
    pub high: String,
    /// 最低价
    pub low: String,
    /// 收盘价
    pub close: String,
    /// 成交量
    pub volume: String,
    /// K线收盘时间（毫秒）
    pub close_time: i64,
    /// 报价资产成交量
    pub quote_asset_volume: String,
    /// 成交笔数
    pub number_of_trades: i64,
    /// 主动买入基础资产成交量
    pub taker_buy_base_asset_volume: String,
    /// 主动买入报价资产成交量
    pub taker_buy_quote_asset_volume: String,
    /// 忽略
    pub ignore: String,
}

impl Kline {
    /// 从原始K线数据创建K线对象
    ///
    /// 币安返回的每一行是12个元素的数组，格式不符时返回None
    pub fn from_raw_kline(raw: &[serde_json::Value]) -> Option<Self> {
        if raw.len() < 12 {
            return None;
        }

        Some(Self {
            open_time: raw[0].as_i64()?,
            open: raw[1].as_str()?.to_string(),
            high: raw[2].as_str()?.to_string(),
            low: raw[3].as_str()?.to_string(),
            close: raw[4].as_str()?.to_string(),
            volume: raw[5].as_str()?.to_string(),
            close_time: raw[6].as_i64()?,
            quote_asset_volume: raw[7].as_str()?.to_string(),
            number_of_trades: raw[8].as_i64()?,
            taker_buy_base_asset_volume: raw[9].as_str()?.to_string(),
            taker_buy_quote_asset_volume: raw[10].as_str()?.to_string(),
            ignore: raw[11].as_str()?.to_string(),
        })
    }

    /// 收盘价（浮点）
    pub fn close_price(&self) -> Result<f64> {
        self.close.trim().parse::<f64>().map_err(|e| {
            AppError::ParseError(format!(
                "无法解析收盘价 '{}' (open_time={}): {}",
                self.close, self.open_time, e
            ))
        })
    }

    /// 开盘时间的UTC标签，例如 "2024-01-01 00:00:00"
    pub fn open_time_label(&self) -> Result<String> {
        let dt = DateTime::<Utc>::from_timestamp_millis(self.open_time).ok_or_else(|| {
            AppError::DataError(format!("开盘时间超出范围: {}", self.open_time))
        })?;
        Ok(dt.format(TIMESTAMP_LABEL_FORMAT).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_row() -> Vec<serde_json::Value> {
        vec![
            json!(1704067200000i64),
            json!("42283.50"),
            json!("42300.00"),
            json!("42250.10"),
            json!("42291.90"),
            json!("120.512"),
            json!(1704067259999i64),
            json!("5094732.11"),
            json!(1532),
            json!("60.201"),
            json!("2545011.70"),
            json!("0"),
        ]
    }

    #[test]
    fn test_from_raw_kline() {
        let kline = Kline::from_raw_kline(&raw_row()).expect("应能解析");
        assert_eq!(kline.open_time, 1704067200000);
        assert_eq!(kline.close, "42291.90");
        assert_eq!(kline.number_of_trades, 1532);
        assert_eq!(kline.close_time, 1704067259999);
    }

    #[test]
    fn test_from_raw_kline_rejects_short_or_mistyped_rows() {
        let row = raw_row();
        assert!(Kline::from_raw_kline(&row[..11]).is_none());

        let mut mistyped = raw_row();
        mistyped[4] = json!(42291.9);
        assert!(Kline::from_raw_kline(&mistyped).is_none());
    }

    #[test]
    fn test_close_price_and_label() {
        let kline = Kline::from_raw_kline(&raw_row()).unwrap();
        assert_eq!(kline.close_price().unwrap(), 42291.9);
        assert_eq!(kline.open_time_label().unwrap(), "2024-01-01 00:00:00");

        let bad = Kline { close: "n/a".to_string(), ..kline };
        assert!(matches!(bad.close_price(), Err(AppError::ParseError(_))));
    }
}
