use serde::{Deserialize, Serialize};
use crate::klcommon::{Kline, Result};

/// `/btc_data` 返回的数据：时间标签与收盘价两个平行数组
///
/// `timestamps[i]` 对应 `close_prices[i]`，两者只靠下标配对
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    pub timestamps: Vec<String>,
    pub close_prices: Vec<f64>,
}

impl ChartPayload {
    /// 由K线序列构造，保持上游顺序
    pub fn from_klines(klines: &[Kline]) -> Result<Self> {
        let mut timestamps = Vec::with_capacity(klines.len());
        let mut close_prices = Vec::with_capacity(klines.len());

        for kline in klines {
            timestamps.push(kline.open_time_label()?);
            close_prices.push(kline.close_price()?);
        }

        Ok(Self { timestamps, close_prices })
    }

    /// 按下标配对后的点数
    pub fn paired_len(&self) -> usize {
        self.timestamps.len().min(self.close_prices.len())
    }

    /// 两个数组长度是否一致
    pub fn is_aligned(&self) -> bool {
        self.timestamps.len() == self.close_prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paired_len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::klcommon::AppError;

    fn kline(open_time: i64, close: &str) -> Kline {
        Kline {
            open_time,
            open: close.to_string(),
            high: close.to_string(),
            low: close.to_string(),
            close: close.to_string(),
            volume: "1".to_string(),
            close_time: open_time + 59_999,
            quote_asset_volume: "0".to_string(),
            number_of_trades: 1,
            taker_buy_base_asset_volume: "0".to_string(),
            taker_buy_quote_asset_volume: "0".to_string(),
            ignore: "0".to_string(),
        }
    }

    #[test]
    fn test_from_klines_keeps_order_and_pairing() {
        let klines: Vec<Kline> = (0..5)
            .map(|i| kline(1704067200000 + i * 60_000, &format!("{}.5", 42000 + i)))
            .collect();

        let payload = ChartPayload::from_klines(&klines).unwrap();
        assert_eq!(payload.timestamps.len(), 5);
        assert_eq!(payload.close_prices.len(), 5);
        assert!(payload.is_aligned());
        assert_eq!(payload.timestamps[0], "2024-01-01 00:00:00");
        assert_eq!(payload.timestamps[4], "2024-01-01 00:04:00");
        assert_eq!(payload.close_prices[0], 42000.5);
        assert_eq!(payload.close_prices[4], 42004.5);
    }

    #[test]
    fn test_from_klines_rejects_non_numeric_close() {
        let klines = vec![kline(1704067200000, "42000"), kline(1704067260000, "")];
        assert!(matches!(ChartPayload::from_klines(&klines), Err(AppError::ParseError(_))));
    }

    #[test]
    fn test_json_shape() {
        let payload = ChartPayload {
            timestamps: vec!["2024-01-01 00:00:00".to_string()],
            close_prices: vec![42000.1],
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "timestamps": ["2024-01-01 00:00:00"],
                "close_prices": [42000.1]
            })
        );
    }

    #[test]
    fn test_mismatched_lengths() {
        let payload: ChartPayload = serde_json::from_str(
            r#"{"timestamps": ["a", "b", "c"], "close_prices": [1.0, 2.0]}"#,
        )
        .unwrap();
        assert!(!payload.is_aligned());
        assert_eq!(payload.paired_len(), 2);
        assert!(!payload.is_empty());
    }
}
