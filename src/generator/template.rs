//! 兜底模板的公共渲染函数

use std::collections::BTreeMap;

use crate::types::product::{ProductRecord, non_blank};

/// 缺失字段的占位文本
pub const NOT_AVAILABLE: &str = "not available";

pub fn value_or_placeholder(value: &Option<String>) -> &str {
    non_blank(value).unwrap_or(NOT_AVAILABLE)
}

/// 无序列表，空列表渲染为一条占位项
pub fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return format!("- {}\n", NOT_AVAILABLE);
    }
    items.iter().map(|item| format!("- {}\n", item)).collect()
}

/// `- **键**: 值` 形式的规格列表
pub fn spec_list(specifications: &BTreeMap<String, String>) -> String {
    if specifications.is_empty() {
        return format!("- {}\n", NOT_AVAILABLE);
    }
    specifications
        .iter()
        .map(|(k, v)| format!("- **{}**: {}\n", k, v))
        .collect()
}

/// 图片链接列表
pub fn image_list(record: &ProductRecord) -> String {
    if record.images.is_empty() {
        return format!("- {}\n", NOT_AVAILABLE);
    }
    record
        .images
        .iter()
        .enumerate()
        .map(|(i, url)| format!("- [{} image {}]({})\n", record.name, i + 1, url))
        .collect()
}

/// 供prompt使用的记录JSON
pub fn record_json(record: &ProductRecord) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|_| format!("{:?}", record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(value_or_placeholder(&None), NOT_AVAILABLE);
        assert_eq!(value_or_placeholder(&Some(" ".to_string())), NOT_AVAILABLE);
        assert_eq!(value_or_placeholder(&Some("$5".to_string())), "$5");
        assert_eq!(bullet_list(&[]), "- not available\n");
        assert_eq!(spec_list(&BTreeMap::new()), "- not available\n");
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            bullet_list(&["NFC".to_string(), "5G".to_string()]),
            "- NFC\n- 5G\n"
        );
        let specs = BTreeMap::from([("Weight".to_string(), "187 g".to_string())]);
        assert_eq!(spec_list(&specs), "- **Weight**: 187 g\n");

        let record = ProductRecord {
            name: "Pixel 9".to_string(),
            images: vec!["https://img.example/p9.png".to_string()],
            ..Default::default()
        };
        assert_eq!(
            image_list(&record),
            "- [Pixel 9 image 1](https://img.example/p9.png)\n"
        );
    }
}
