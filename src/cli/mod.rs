use crate::config::{Config, LLMProvider};
use crate::i18n::TargetLanguage;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// 默认配置文件名，位于当前工作目录
pub const DEFAULT_CONFIG_FILE: &str = "product-compare.toml";

/// Product Compare - 汇总多个数据源的产品信息，并由AI生成对比报告与README
#[derive(Parser, Debug)]
#[command(name = "product-compare")]
#[command(
    about = "Aggregates product data from several scraping sources and generates an AI-written comparison and README, with deterministic fallbacks when sources or the language model are unavailable."
)]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// 配置文件路径
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 是否启用详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 监听地址
    #[arg(long)]
    pub host: Option<String>,

    /// 监听端口
    #[arg(short, long)]
    pub port: Option<u16>,

    /// LLM Provider (openai, moonshot, deepseek, mistral, openrouter, anthropic, gemini, ollama)
    #[arg(long, global = true)]
    pub llm_provider: Option<String>,

    /// LLM API KEY
    #[arg(long, global = true)]
    pub llm_api_key: Option<String>,

    /// LLM API基地址
    #[arg(long, global = true)]
    pub llm_api_base_url: Option<String>,

    /// 模型名称
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// 最大tokens数
    #[arg(long, global = true)]
    pub max_tokens: Option<u32>,

    /// 温度参数
    #[arg(long, global = true)]
    pub temperature: Option<f64>,

    /// 目标语言 (zh, en, ja, ko, de, fr, ru)
    #[arg(long, global = true)]
    pub target_language: Option<String>,

    /// 并发抓取各数据源
    #[arg(long, global = true)]
    pub concurrent_sources: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// 启动HTTP服务（默认）
    Serve,

    /// 检查模型配置与连接
    Check,

    /// 执行一次对比并把README写到磁盘
    Compare {
        /// 第一个产品名称
        product1: String,

        /// 第二个产品名称
        product2: String,

        /// 使用的抓取方式，逗号分隔；缺省时使用全部已配置的方式
        #[arg(short, long, value_delimiter = ',')]
        methods: Vec<String>,

        /// README输出路径，缺省时按目标语言命名
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 同时保存完整结果（含日志）的JSON路径
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

impl Args {
    /// 将CLI参数转换为配置
    pub fn into_config(self) -> Result<Config> {
        let mut config = if let Some(config_path) = &self.config {
            // 显式指定的配置文件必须可读
            Config::from_file(config_path)?
        } else {
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(DEFAULT_CONFIG_FILE);

            if default_config_path.exists() {
                Config::from_file(&default_config_path)?
            } else {
                Config::default()
            }
        };

        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            if let Ok(provider) = provider_str.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的provider: {}，使用默认provider",
                    provider_str
                );
            }
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model) = self.model {
            config.llm.model = model;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }

        // 目标语言配置
        if let Some(target_language_str) = self.target_language {
            if let Ok(target_language) = target_language_str.parse::<TargetLanguage>() {
                config.target_language = target_language;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的目标语言: {}，使用默认语言 ({})",
                    target_language_str,
                    config.target_language.display_name()
                );
            }
        }

        if self.concurrent_sources {
            config.sources.concurrent = true;
        }
        config.verbose = self.verbose;

        Ok(config)
    }
}
