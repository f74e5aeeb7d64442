use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::generator::fallback::FallbackPolicy;
use crate::i18n::TargetLanguage;

/// API KEY 的环境变量名
pub const API_KEY_ENV: &str = "PRODUCT_COMPARE_LLM_API_KEY";

/// 示例配置中的占位值，视同未配置
const PLACEHOLDER_API_KEYS: [&str; 2] = ["your-api-key-here", "your_api_key_here"];

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "moonshot")]
    Moonshot,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "mistral")]
    Mistral,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Moonshot => write!(f, "moonshot"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Mistral => write!(f, "mistral"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Gemini => write!(f, "gemini"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "moonshot" => Ok(LLMProvider::Moonshot),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "mistral" => Ok(LLMProvider::Mistral),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "gemini" => Ok(LLMProvider::Gemini),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

impl LLMProvider {
    /// 是否需要API KEY（本地Ollama不需要）
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LLMProvider::Ollama)
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// HTTP服务配置
    pub server: ServerConfig,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 生成文本的目标语言
    pub target_language: TargetLanguage,

    /// 数据源配置
    pub sources: SourcesConfig,

    /// 兜底数据生成策略
    pub fallback: FallbackPolicy,

    /// 会话跟踪配置
    pub session: SessionConfig,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// HTTP服务配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许任意来源的跨域请求（前端开发时使用）
    pub cors_allow_any: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 用于对比与文档生成的模型
    pub model: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 重试次数
    pub retry_attempts: u32,

    /// 重试间隔（毫秒）
    pub retry_delay_ms: u64,

    /// 单次调用超时时间（秒）
    pub timeout_seconds: u64,
}

/// 数据源配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SourcesConfig {
    /// 并发抓取各数据源（合并顺序仍按选择顺序）
    pub concurrent: bool,

    /// 部署中可用的抓取方式
    pub methods: Vec<SourceMethodConfig>,
}

/// 单个抓取方式
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SourceMethodConfig {
    /// 请求中使用的标识符
    pub id: String,

    /// 抓取服务地址，未配置时该数据源总是回退到兜底数据
    #[serde(default)]
    pub endpoint: Option<String>,

    /// 抓取超时时间（秒）
    #[serde(default = "default_source_timeout")]
    pub timeout_seconds: u64,
}

fn default_source_timeout() -> u64 {
    30
}

/// 会话跟踪配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// 会话保留时间（秒）
    pub ttl_seconds: u64,

    /// 过期清理间隔（秒）
    pub sweep_interval_seconds: u64,
}

/// API KEY 校验失败的原因
#[derive(Debug, Clone, PartialEq)]
pub enum ApiKeyProblem {
    Missing,
    Placeholder,
}

impl Config {
    /// 从文件加载配置
    ///
    /// 文件中的API KEY为空或为占位值时，使用环境变量中的值。
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_file_with_env_key(path, std::env::var(API_KEY_ENV).ok())
    }

    pub(crate) fn from_file_with_env_key(path: &Path, env_key: Option<String>) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let mut config: Config =
            toml::from_str(&content).context("Failed to parse config file")?;
        config.llm.fill_api_key_from(env_key);
        Ok(config)
    }

    /// 部署中配置的数据源标识符
    pub fn source_ids(&self) -> Vec<String> {
        self.sources.methods.iter().map(|m| m.id.clone()).collect()
    }
}

impl LLMConfig {
    /// 当前API KEY不可用时改用 `env_key`
    pub fn fill_api_key_from(&mut self, env_key: Option<String>) {
        let Some(env_key) = env_key.filter(|k| !k.trim().is_empty()) else {
            return;
        };
        if is_placeholder_or_blank(&self.api_key) {
            self.api_key = env_key;
        }
    }

    /// 检查API KEY是否存在且不是占位值
    pub fn check_api_key(&self) -> Result<(), ApiKeyProblem> {
        if !self.provider.requires_api_key() {
            return Ok(());
        }

        if self.api_key.trim().is_empty() {
            return Err(ApiKeyProblem::Missing);
        }
        if is_placeholder_or_blank(&self.api_key) {
            return Err(ApiKeyProblem::Placeholder);
        }
        Ok(())
    }
}

fn is_placeholder_or_blank(key: &str) -> bool {
    let key = key.trim();
    key.is_empty()
        || PLACEHOLDER_API_KEYS
            .iter()
            .any(|placeholder| key.eq_ignore_ascii_case(placeholder))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            llm: LLMConfig::default(),
            target_language: TargetLanguage::default(),
            sources: SourcesConfig::default(),
            fallback: FallbackPolicy::default(),
            session: SessionConfig::default(),
            verbose: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 3001,
            cors_allow_any: true,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var(API_KEY_ENV).unwrap_or_default(),
            api_base_url: String::from("https://api.openai.com/v1"),
            model: String::from("gpt-4o-mini"),
            max_tokens: 4096,
            temperature: 0.3,
            retry_attempts: 2,
            retry_delay_ms: 1000,
            timeout_seconds: 60,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        let method = |id: &str| SourceMethodConfig {
            id: id.to_string(),
            endpoint: None,
            timeout_seconds: default_source_timeout(),
        };
        Self {
            concurrent: false,
            methods: vec![method("puppeteer"), method("playwright"), method("selenium")],
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 30 * 60,
            sweep_interval_seconds: 60,
        }
    }
}
