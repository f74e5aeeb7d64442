//! 多数据源记录合并
//!
//! 按数据源调用顺序从左到右折叠：
//! - 价格、评分、描述、库存状态取第一个非空值
//! - 功能特性与图片取并集，按字符串精确去重，保持首次出现的顺序
//! - 规格参数依次覆盖，后出现的同名键覆盖先出现的值

use std::collections::HashSet;

use crate::types::product::{ProductRecord, non_blank};

/// 把同一产品的若干局部记录合并为一条，合并结果的名称为 `name`
pub fn merge_records(name: &str, records: &[ProductRecord]) -> ProductRecord {
    let mut merged = ProductRecord::new(name);
    let mut seen_features = HashSet::new();
    let mut seen_images = HashSet::new();

    for record in records {
        fill_first(&mut merged.price, &record.price);
        fill_first(&mut merged.rating, &record.rating);
        fill_first(&mut merged.description, &record.description);
        fill_first(&mut merged.availability, &record.availability);

        union_into(&mut merged.features, &mut seen_features, &record.features);
        union_into(&mut merged.images, &mut seen_images, &record.images);

        merged.specifications.extend(
            record
                .specifications
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
    }

    merged
}

fn fill_first(target: &mut Option<String>, candidate: &Option<String>) {
    if target.is_none()
        && let Some(value) = non_blank(candidate)
    {
        *target = Some(value.to_string());
    }
}

fn union_into(target: &mut Vec<String>, seen: &mut HashSet<String>, items: &[String]) {
    for item in items {
        if seen.insert(item.clone()) {
            target.push(item.clone());
        }
    }
}
