use std::sync::Arc;

use anyhow::Result;

use crate::{
    config::Config,
    generator::fallback::FallbackGenerator,
    llm::{LLMClient, TextGenerator},
    sources::SourceRegistry,
};

#[derive(Clone)]
pub struct GeneratorContext {
    /// LLM调用器，用于与AI通信。
    pub llm_client: Arc<dyn TextGenerator>,
    /// 配置
    pub config: Config,
    /// 部署中可用的数据源
    pub sources: SourceRegistry,
    /// 兜底数据生成器
    pub fallback: FallbackGenerator,
}

impl GeneratorContext {
    /// 根据配置创建生成器上下文
    pub fn new(config: Config) -> Result<Self> {
        let llm_client = Arc::new(LLMClient::new(config.llm.clone())?);
        let sources = SourceRegistry::from_config(&config.sources)?;
        Ok(Self::with_parts(config, llm_client, sources))
    }

    /// 使用指定的模型与数据源创建上下文
    pub fn with_parts(
        config: Config,
        llm_client: Arc<dyn TextGenerator>,
        sources: SourceRegistry,
    ) -> Self {
        let fallback = FallbackGenerator::new(config.fallback.clone());
        Self {
            llm_client,
            config,
            sources,
            fallback,
        }
    }
}
