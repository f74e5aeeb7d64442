//! 产品数据源
//!
//! 每种抓取方式实现同一个 [`ProductSource`] 契约，编排层按请求中的标识符选择数据源。

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::SourcesConfig;
use crate::types::product::ProductRecord;

pub mod http;

pub use http::HttpScrapeSource;

/// 数据源错误，编排层统一把它转为兜底数据
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source `{0}` has no scraper endpoint configured")]
    NotConfigured(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("scraper responded with status {0}")]
    Status(u16),

    #[error("could not decode scraper response: {0}")]
    Decode(String),

    #[error("source returned no product data")]
    Empty,

    #[error("{0}")]
    Other(String),
}

/// 数据源特征
#[async_trait]
pub trait ProductSource: Send + Sync + std::fmt::Debug {
    /// 请求中使用的标识符
    fn id(&self) -> &str;

    /// 抓取指定产品的局部记录
    async fn fetch(&self, product_name: &str) -> Result<ProductRecord, SourceError>;
}

/// 按请求选出的数据源
#[derive(Debug, Default)]
pub struct SourceSelection {
    /// 按请求顺序排列，重复的标识符只保留第一次
    pub sources: Vec<Arc<dyn ProductSource>>,
    /// 部署中不存在的标识符
    pub unknown: Vec<String>,
}

/// 数据源注册表
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn ProductSource>>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<Arc<dyn ProductSource>>) -> Self {
        Self { sources }
    }

    /// 根据配置为每种抓取方式创建HTTP数据源
    pub fn from_config(config: &SourcesConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("product-compare/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let sources = config
            .methods
            .iter()
            .map(|method| {
                Arc::new(HttpScrapeSource::new(method.clone(), client.clone()))
                    as Arc<dyn ProductSource>
            })
            .collect();

        Ok(Self { sources })
    }

    /// 已注册的标识符
    pub fn ids(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.id().to_string()).collect()
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn ProductSource>> {
        self.sources.iter().find(|s| s.id() == id).cloned()
    }

    /// 按请求顺序选择数据源，未知标识符单独返回
    pub fn select(&self, ids: &[String]) -> SourceSelection {
        let mut selection = SourceSelection::default();

        for id in ids {
            let id = id.trim();
            if selection.sources.iter().any(|s| s.id() == id) {
                continue;
            }
            match self.get(id) {
                Some(source) => selection.sources.push(source),
                None => selection.unknown.push(id.to_string()),
            }
        }

        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourcesConfig;

    #[derive(Debug)]
    struct NamedSource(&'static str);

    #[async_trait]
    impl ProductSource for NamedSource {
        fn id(&self) -> &str {
            self.0
        }

        async fn fetch(&self, product_name: &str) -> Result<ProductRecord, SourceError> {
            Ok(ProductRecord::new(product_name))
        }
    }

    fn registry() -> SourceRegistry {
        SourceRegistry::new(vec![
            Arc::new(NamedSource("puppeteer")),
            Arc::new(NamedSource("playwright")),
            Arc::new(NamedSource("selenium")),
        ])
    }

    #[test]
    fn test_select_keeps_request_order() {
        let selection = registry().select(&["selenium".to_string(), "puppeteer".to_string()]);
        let ids: Vec<&str> = selection.sources.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["selenium", "puppeteer"]);
        assert!(selection.unknown.is_empty());
    }

    #[test]
    fn test_select_drops_unknown_and_duplicates() {
        let selection = registry().select(&[
            "playwright".to_string(),
            "cheerio".to_string(),
            "playwright".to_string(),
        ]);
        assert_eq!(selection.sources.len(), 1);
        assert_eq!(selection.unknown, vec!["cheerio"]);
    }

    #[test]
    fn test_from_config_registers_every_method() {
        let registry = SourceRegistry::from_config(&SourcesConfig::default()).unwrap();
        assert_eq!(registry.ids(), vec!["puppeteer", "playwright", "selenium"]);
        assert!(registry.get("selenium").is_some());
        assert!(registry.get("cheerio").is_none());
    }
}
