//! 单个产品的多数据源汇总

use futures::FutureExt;
use futures::future::join_all;
use serde_json::json;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::generator::fallback::FallbackGenerator;
use crate::generator::merge::merge_records;
use crate::logging::RequestLog;
use crate::sources::{ProductSource, SourceError};
use crate::types::product::ProductRecord;

/// 汇总器：依次调用数据源，失败时以兜底数据替代，最后合并
pub struct ProductAggregator<'a> {
    fallback: &'a FallbackGenerator,
    log: &'a RequestLog,
    concurrent: bool,
}

impl<'a> ProductAggregator<'a> {
    pub fn new(fallback: &'a FallbackGenerator, log: &'a RequestLog) -> Self {
        Self {
            fallback,
            log,
            concurrent: false,
        }
    }

    /// 并发调用全部数据源；结果仍按数据源顺序参与合并
    pub fn concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// 汇总一个产品，不会返回错误
    pub async fn aggregate(
        &self,
        product_name: &str,
        sources: &[Arc<dyn ProductSource>],
    ) -> ProductRecord {
        let outcomes = if self.concurrent {
            join_all(sources.iter().map(|s| fetch_isolated(s.as_ref(), product_name))).await
        } else {
            let mut outcomes = Vec::with_capacity(sources.len());
            for source in sources {
                outcomes.push(fetch_isolated(source.as_ref(), product_name).await);
            }
            outcomes
        };

        let mut records = Vec::with_capacity(sources.len() + 1);
        for (source, outcome) in sources.iter().zip(outcomes) {
            match outcome {
                Ok(record) => {
                    self.log.info_with(
                        format!("Fetched data for \"{}\" from {}", product_name, source.id()),
                        json!({ "source": source.id(), "product": product_name }),
                    );
                    records.push(record);
                }
                Err(err) => {
                    self.log.warn_with(
                        format!(
                            "Source {} failed for \"{}\", using fallback data",
                            source.id(),
                            product_name
                        ),
                        json!({
                            "source": source.id(),
                            "product": product_name,
                            "error": err.to_string(),
                        }),
                    );
                    records.push(self.fallback.generate(product_name));
                }
            }
        }

        if records.is_empty() {
            self.log.warn_with(
                format!("No source data for \"{}\", generating fallback data", product_name),
                json!({
                    "product": product_name,
                    "category": self.fallback.classify(product_name).to_string(),
                }),
            );
            records.push(self.fallback.generate(product_name));
        }

        merge_records(product_name, &records)
    }
}

/// 调用数据源并隔离其错误与panic，空结果同样视为失败
async fn fetch_isolated(
    source: &dyn ProductSource,
    product_name: &str,
) -> Result<ProductRecord, SourceError> {
    let outcome = AssertUnwindSafe(source.fetch(product_name))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(SourceError::Other(panic_message(panic.as_ref()))));

    match outcome {
        Ok(record) if record.is_empty() => Err(SourceError::Empty),
        other => other,
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("source panicked: {}", detail)
}
