//! 通过HTTP调用外部抓取服务（puppeteer / playwright / selenium 等浏览器自动化进程）

use async_trait::async_trait;
use std::time::Duration;

use super::{ProductSource, SourceError};
use crate::config::SourceMethodConfig;
use crate::types::product::ProductRecord;

/// HTTP抓取数据源
///
/// 请求 `GET <endpoint>?product=<name>`，响应体为JSON格式的局部产品记录，
/// 字段与 [`ProductRecord`] 一致，均可省略。
#[derive(Debug, Clone)]
pub struct HttpScrapeSource {
    method: SourceMethodConfig,
    client: reqwest::Client,
}

impl HttpScrapeSource {
    pub fn new(method: SourceMethodConfig, client: reqwest::Client) -> Self {
        Self { method, client }
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.method
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
    }
}

#[async_trait]
impl ProductSource for HttpScrapeSource {
    fn id(&self) -> &str {
        &self.method.id
    }

    async fn fetch(&self, product_name: &str) -> Result<ProductRecord, SourceError> {
        let endpoint = self
            .endpoint()
            .ok_or_else(|| SourceError::NotConfigured(self.method.id.clone()))?;

        tracing::debug!(source = %self.method.id, endpoint, product = product_name, "fetching product");

        let response = self
            .client
            .get(endpoint)
            .query(&[("product", product_name)])
            .timeout(Duration::from_secs(self.method.timeout_seconds))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let mut record: ProductRecord =
            serde_json::from_str(&body).map_err(|e| SourceError::Decode(e.to_string()))?;

        // 抓取到的标题常常与请求名称不同，统一使用请求名称
        record.name = product_name.to_string();

        if record.is_empty() {
            return Err(SourceError::Empty);
        }
        Ok(record)
    }
}
