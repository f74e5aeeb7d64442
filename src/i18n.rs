use serde::{Deserialize, Serialize};

/// 目标语言类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum TargetLanguage {
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "en")]
    #[default]
    English,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "ru")]
    Russian,
}

impl std::fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetLanguage::Chinese => write!(f, "zh"),
            TargetLanguage::English => write!(f, "en"),
            TargetLanguage::Japanese => write!(f, "ja"),
            TargetLanguage::Korean => write!(f, "ko"),
            TargetLanguage::German => write!(f, "de"),
            TargetLanguage::French => write!(f, "fr"),
            TargetLanguage::Russian => write!(f, "ru"),
        }
    }
}

impl std::str::FromStr for TargetLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zh" | "chinese" | "中文" => Ok(TargetLanguage::Chinese),
            "en" | "english" | "英文" => Ok(TargetLanguage::English),
            "ja" | "japanese" | "日本語" | "日文" => Ok(TargetLanguage::Japanese),
            "ko" | "korean" | "한국어" | "韩文" => Ok(TargetLanguage::Korean),
            "de" | "german" | "deutsch" | "德文" => Ok(TargetLanguage::German),
            "fr" | "french" | "français" | "法文" => Ok(TargetLanguage::French),
            "ru" | "russian" | "русский" | "俄文" => Ok(TargetLanguage::Russian),
            _ => Err(format!("Unknown target language: {}", s)),
        }
    }
}

impl TargetLanguage {
    /// 获取语言的描述性名称
    pub fn display_name(&self) -> &'static str {
        match self {
            TargetLanguage::Chinese => "中文",
            TargetLanguage::English => "English",
            TargetLanguage::Japanese => "日本語",
            TargetLanguage::Korean => "한국어",
            TargetLanguage::German => "Deutsch",
            TargetLanguage::French => "Français",
            TargetLanguage::Russian => "Русский",
        }
    }

    /// 获取语言的提示词指令，追加在对比与文档生成的prompt末尾
    pub fn prompt_instruction(&self) -> &'static str {
        match self {
            TargetLanguage::Chinese => "请使用中文撰写，确保表达准确、客观、易于消费者理解。",
            TargetLanguage::English => {
                "Write in English, keeping the language accurate, objective and easy for shoppers to understand."
            }
            TargetLanguage::Japanese => {
                "日本語で作成してください。正確かつ客観的で、購入者にとって分かりやすい表現を心がけてください。"
            }
            TargetLanguage::Korean => {
                "한국어로 작성해 주세요. 정확하고 객관적이며 구매자가 이해하기 쉬운 표현을 사용해 주세요."
            }
            TargetLanguage::German => {
                "Bitte auf Deutsch schreiben, präzise, sachlich und für Käufer leicht verständlich."
            }
            TargetLanguage::French => {
                "Veuillez rédiger en français, de manière précise, objective et facile à comprendre pour les acheteurs."
            }
            TargetLanguage::Russian => {
                "Пожалуйста, пишите на русском языке точно, объективно и понятно для покупателей."
            }
        }
    }

    /// 生成的README文件名
    pub fn readme_filename(&self) -> String {
        match self {
            TargetLanguage::English => "README.md".to_string(),
            other => format!("README.{}.md", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("EN".parse::<TargetLanguage>().unwrap(), TargetLanguage::English);
        assert_eq!("中文".parse::<TargetLanguage>().unwrap(), TargetLanguage::Chinese);
        assert_eq!("deutsch".parse::<TargetLanguage>().unwrap(), TargetLanguage::German);
        assert!("klingon".parse::<TargetLanguage>().is_err());
    }

    #[test]
    fn test_readme_filename() {
        assert_eq!(TargetLanguage::English.readme_filename(), "README.md");
        assert_eq!(TargetLanguage::Japanese.readme_filename(), "README.ja.md");
    }
}
