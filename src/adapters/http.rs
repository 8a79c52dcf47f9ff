use crate::core::OrderSource;
use crate::utils::error::{OrderError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// 以 HTTP GET 取得發佈成 TSV 的試算表
#[derive(Debug, Clone)]
pub struct HttpOrderSource {
    client: Client,
}

impl HttpOrderSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl OrderSource for HttpOrderSource {
    async fn fetch_daily_table(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        tracing::debug!("Spreadsheet response status: {}", response.status());

        if !response.status().is_success() {
            return Err(OrderError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        // 試算表固定是 UTF-8，不依賴 Content-Type 的 charset
        let bytes = response.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
