use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;
use crate::klchart::ChartPayload;
use crate::klcommon::{AppError, Result};

/// 数据端点的固定路径
pub const DATA_PATH: &str = "btc_data";

/// 图表数据客户端：请求图表服务器的 `/btc_data` 并解码
///
/// 失败直接返回给调用方，不做重试，也不设请求超时
#[derive(Clone, Debug)]
pub struct ChartClient {
    data_url: Url,
    client: Client,
}

impl ChartClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let data_url = base.join(DATA_PATH)?;

        let client = Client::builder()
            .build()
            .map_err(|e| AppError::ApiError(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self { data_url, client })
    }

    pub fn data_url(&self) -> &Url {
        &self.data_url
    }

    /// 获取载荷，可附带 symbol / interval / limit 查询参数
    #[instrument(skip(self), fields(url = %self.data_url), err)]
    pub async fn fetch_payload(&self, query: &[(&str, String)]) -> Result<ChartPayload> {
        let response = self.client.get(self.data_url.clone()).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(AppError::ApiError(format!("图表服务器返回错误: {} - {}", status, text)));
        }

        let payload: ChartPayload = response.json().await?;
        debug!(
            target: "chart",
            timestamps = payload.timestamps.len(),
            close_prices = payload.close_prices.len(),
            "已获取图表数据"
        );
        Ok(payload)
    }
}
