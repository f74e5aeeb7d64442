use serde::{Deserialize, Serialize};

use crate::logging::LogEntry;
use crate::types::product::ProductRecord;

/// 对比请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonRequest {
    pub product1: String,
    pub product2: String,
    /// 按选择顺序排列的数据源标识符
    pub methods: Vec<String>,
}

impl ComparisonRequest {
    pub fn new(
        product1: impl Into<String>,
        product2: impl Into<String>,
        methods: Vec<String>,
    ) -> Self {
        Self {
            product1: product1.into(),
            product2: product2.into(),
            methods,
        }
    }
}

/// 对比结果，构造后不再修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub product1: ProductRecord,
    pub product2: ProductRecord,
    pub comparison: String,
    pub readme: String,
    pub logs: Vec<LogEntry>,
}
