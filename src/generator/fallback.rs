//! 兜底数据生成：没有数据源给出可用数据时，合成一份看起来合理的产品记录

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::product::ProductRecord;

/// 产品类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductCategory {
    Phone,
    Laptop,
    Generic,
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductCategory::Phone => write!(f, "phone"),
            ProductCategory::Laptop => write!(f, "laptop"),
            ProductCategory::Generic => write!(f, "generic"),
        }
    }
}

/// 单个类别的合成规则
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPolicy {
    /// 名称中包含任一关键词（忽略大小写）即归入该类别
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    /// 价格整数部分的取值范围（含两端）
    #[serde(default)]
    pub min_price: u32,
    #[serde(default)]
    pub max_price: u32,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    /// 描述模板，`{name}` 会被替换为产品名称
    #[serde(default)]
    pub description: String,
}

/// 兜底数据策略
///
/// 关键词与取值范围只是经验值，可以通过配置文件的 `[fallback]` 表覆盖。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackPolicy {
    #[serde(default = "CategoryPolicy::phone")]
    pub phone: CategoryPolicy,
    #[serde(default = "CategoryPolicy::laptop")]
    pub laptop: CategoryPolicy,
    #[serde(default = "CategoryPolicy::generic")]
    pub generic: CategoryPolicy,
    /// 评分范围，保留一位小数
    #[serde(default = "default_min_rating")]
    pub min_rating: f64,
    #[serde(default = "default_max_rating")]
    pub max_rating: f64,
    #[serde(default = "default_availability")]
    pub availability: String,
}

fn default_min_rating() -> f64 {
    3.5
}

fn default_max_rating() -> f64 {
    5.0
}

fn default_availability() -> String {
    "Check retailer for availability".to_string()
}

fn string_vec(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn string_map(items: &[(&str, &str)]) -> BTreeMap<String, String> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl CategoryPolicy {
    pub fn phone() -> Self {
        Self {
            keywords: string_vec(&[
                "phone",
                "iphone",
                "galaxy",
                "pixel",
                "oneplus",
                "xiaomi",
                "motorola",
                "smartphone",
            ]),
            features: string_vec(&[
                "5G connectivity",
                "Multi-lens camera system",
                "High refresh rate OLED display",
                "Fast wired and wireless charging",
                "Water and dust resistance",
                "Face and fingerprint unlock",
            ]),
            min_price: 599,
            max_price: 1299,
            specifications: string_map(&[
                ("Type", "Smartphone"),
                ("Display", "6.1 - 6.8 inch OLED"),
                ("Storage", "128GB - 1TB"),
                ("Camera", "Multi-lens rear camera"),
                ("Battery", "All-day battery"),
                ("Connectivity", "5G, Wi-Fi, Bluetooth, NFC"),
            ]),
            description: "{name} is a modern smartphone offering a high-quality display, a capable camera system and all-day battery life.".to_string(),
        }
    }

    pub fn laptop() -> Self {
        Self {
            keywords: string_vec(&[
                "laptop",
                "macbook",
                "notebook",
                "thinkpad",
                "chromebook",
                "ultrabook",
                "xps",
                "zenbook",
            ]),
            features: string_vec(&[
                "Multi-core processor",
                "High-resolution display",
                "Backlit keyboard",
                "Long battery life",
                "Fast SSD storage",
                "USB-C / Thunderbolt ports",
            ]),
            min_price: 799,
            max_price: 2499,
            specifications: string_map(&[
                ("Type", "Laptop"),
                ("Display", "13 - 16 inch"),
                ("Memory", "8GB - 32GB RAM"),
                ("Storage", "256GB - 2TB SSD"),
                ("Battery", "Up to 18 hours"),
                ("Weight", "1.2 - 2.5 kg"),
            ]),
            description: "{name} is a portable computer built for productivity, combining a sharp display with solid performance and battery life.".to_string(),
        }
    }

    pub fn generic() -> Self {
        Self {
            keywords: Vec::new(),
            features: string_vec(&[
                "Reliable build quality",
                "User-friendly design",
                "Good value for money",
                "Manufacturer warranty",
            ]),
            min_price: 49,
            max_price: 499,
            specifications: string_map(&[
                ("Type", "General Product"),
                ("Warranty", "1 year limited"),
                ("Condition", "New"),
            ]),
            description: "{name} is a well-regarded product in its category.".to_string(),
        }
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            phone: CategoryPolicy::phone(),
            laptop: CategoryPolicy::laptop(),
            generic: CategoryPolicy::generic(),
            min_rating: default_min_rating(),
            max_rating: default_max_rating(),
            availability: default_availability(),
        }
    }
}

/// 兜底数据生成器
#[derive(Debug, Clone, Default)]
pub struct FallbackGenerator {
    policy: FallbackPolicy,
}

impl FallbackGenerator {
    pub fn new(policy: FallbackPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }

    /// 按关键词把名称归类，手机优先于笔记本
    pub fn classify(&self, name: &str) -> ProductCategory {
        let lowered = name.to_lowercase();
        let matches = |policy: &CategoryPolicy| {
            policy
                .keywords
                .iter()
                .filter(|k| !k.trim().is_empty())
                .any(|k| lowered.contains(&k.to_lowercase()))
        };

        if matches(&self.policy.phone) {
            ProductCategory::Phone
        } else if matches(&self.policy.laptop) {
            ProductCategory::Laptop
        } else {
            ProductCategory::Generic
        }
    }

    pub fn category_policy(&self, category: ProductCategory) -> &CategoryPolicy {
        match category {
            ProductCategory::Phone => &self.policy.phone,
            ProductCategory::Laptop => &self.policy.laptop,
            ProductCategory::Generic => &self.policy.generic,
        }
    }

    /// 使用线程本地随机数生成
    pub fn generate(&self, name: &str) -> ProductRecord {
        self.generate_with(name, &mut rand::rng())
    }

    /// 使用指定随机数源生成，便于测试时固定种子
    pub fn generate_with<R: Rng>(&self, name: &str, rng: &mut R) -> ProductRecord {
        let category = self.classify(name);
        let policy = self.category_policy(category);

        let low = policy.min_price.min(policy.max_price);
        let high = policy.min_price.max(policy.max_price);
        let price = rng.random_range(low..=high);

        // 以十分位整数取值，保证恰好一位小数
        let rating_low = (self.policy.min_rating.min(self.policy.max_rating) * 10.0).round() as u32;
        let rating_high =
            (self.policy.min_rating.max(self.policy.max_rating) * 10.0).round() as u32;
        let tenths = rng.random_range(rating_low..=rating_high);

        ProductRecord {
            name: name.to_string(),
            price: Some(format!("${}.99", price)),
            rating: Some(format!("{:.1}/5 (estimated)", tenths as f64 / 10.0)),
            description: Some(policy.description.replace("{name}", name)),
            availability: Some(self.policy.availability.clone()),
            features: policy.features.clone(),
            images: Vec::new(),
            specifications: policy.specifications.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn price_value(record: &ProductRecord) -> u32 {
        let price = record.price.as_deref().unwrap();
        assert!(price.starts_with('$'));
        assert!(price.ends_with(".99"));
        price
            .trim_start_matches('$')
            .trim_end_matches(".99")
            .parse()
            .unwrap()
    }

    #[test]
    fn test_classify() {
        let generator = FallbackGenerator::default();
        assert_eq!(generator.classify("iPhone 15 Pro"), ProductCategory::Phone);
        assert_eq!(
            generator.classify("Samsung Galaxy S24 Ultra"),
            ProductCategory::Phone
        );
        assert_eq!(
            generator.classify("Apple MacBook Air M3"),
            ProductCategory::Laptop
        );
        assert_eq!(
            generator.classify("Dyson V15 Detect Vacuum"),
            ProductCategory::Generic
        );
        assert_eq!(generator.classify(""), ProductCategory::Generic);
    }

    #[test]
    fn test_phone_record() {
        let generator = FallbackGenerator::default();
        let record = generator.generate("Google Pixel 9");

        assert_eq!(record.name, "Google Pixel 9");
        assert_eq!(
            record.specifications.get("Type").map(String::as_str),
            Some("Smartphone")
        );
        assert_eq!(record.features, CategoryPolicy::phone().features);
        assert!(record.description.unwrap().contains("Google Pixel 9"));
        assert!(record.images.is_empty());
    }

    #[test]
    fn test_values_stay_in_range() {
        let generator = FallbackGenerator::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let record = generator.generate_with("Dell XPS 13 laptop", &mut rng);
            let price = price_value(&record);
            assert!((799..=2499).contains(&price));

            let rating = record.rating.unwrap();
            assert!(rating.ends_with("/5 (estimated)"));
            let value: f64 = rating.split('/').next().unwrap().parse().unwrap();
            assert!((3.5..=5.0).contains(&value));
            assert_eq!(rating.split('/').next().unwrap().split('.').nth(1).unwrap().len(), 1);
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let generator = FallbackGenerator::default();
        let a = generator.generate_with("Kindle", &mut StdRng::seed_from_u64(42));
        let b = generator.generate_with("Kindle", &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_inverted_ranges_do_not_panic() {
        let policy = FallbackPolicy {
            generic: CategoryPolicy {
                min_price: 500,
                max_price: 100,
                ..CategoryPolicy::generic()
            },
            min_rating: 4.8,
            max_rating: 4.2,
            ..Default::default()
        };
        let generator = FallbackGenerator::new(policy);
        let record = generator.generate_with("Desk lamp", &mut StdRng::seed_from_u64(1));
        assert!((100..=500).contains(&price_value(&record)));
    }

    #[test]
    fn test_custom_keywords() {
        let policy = FallbackPolicy {
            laptop: CategoryPolicy {
                keywords: vec!["surface".to_string()],
                ..CategoryPolicy::laptop()
            },
            ..Default::default()
        };
        let generator = FallbackGenerator::new(policy);
        assert_eq!(
            generator.classify("Microsoft Surface Pro"),
            ProductCategory::Laptop
        );
        assert_eq!(generator.classify("ThinkPad X1"), ProductCategory::Generic);
    }
}
