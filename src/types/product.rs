use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单个产品的规范化描述
///
/// 数据源返回的局部记录与合并后的最终记录使用同一结构，
/// 缺失字段为 `None` 或空集合。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRecord {
    /// 调用方给出的产品名称
    pub name: String,
    /// 价格，人类可读格式，如 "$799.99"
    pub price: Option<String>,
    /// 评分，兜底数据会带 "(estimated)" 标记
    pub rating: Option<String>,
    pub description: Option<String>,
    pub availability: Option<String>,
    /// 功能特性，去重后保持首次出现的顺序
    pub features: Vec<String>,
    /// 图片URL
    pub images: Vec<String>,
    /// 规格参数，键按字典序排列
    pub specifications: BTreeMap<String, String>,
}

impl ProductRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// 除名称外没有任何可用数据
    pub fn is_empty(&self) -> bool {
        [
            &self.price,
            &self.rating,
            &self.description,
            &self.availability,
        ]
        .iter()
        .all(|value| non_blank(value).is_none())
            && self.features.is_empty()
            && self.images.is_empty()
            && self.specifications.is_empty()
    }
}

/// 过滤掉空白字符串
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_empty() {
        let record = ProductRecord::new("Pixel 9");
        assert_eq!(record.name, "Pixel 9");
        assert!(record.is_empty());
    }

    #[test]
    fn test_blank_scalars_count_as_empty() {
        let record = ProductRecord {
            name: "Pixel 9".to_string(),
            price: Some("  ".to_string()),
            description: Some(String::new()),
            ..Default::default()
        };
        assert!(record.is_empty());
    }

    #[test]
    fn test_any_collection_makes_record_non_empty() {
        let mut record = ProductRecord::new("Pixel 9");
        record
            .specifications
            .insert("Color".to_string(), "Obsidian".to_string());
        assert!(!record.is_empty());
    }

    #[test]
    fn test_deserialize_partial_json() {
        let record: ProductRecord =
            serde_json::from_str(r#"{"price":"$499.00","features":["NFC"]}"#).unwrap();
        assert_eq!(record.name, "");
        assert_eq!(record.price.as_deref(), Some("$499.00"));
        assert_eq!(record.features, vec!["NFC"]);
        assert!(record.images.is_empty());
    }
}
