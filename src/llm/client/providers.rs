//! LLM Provider支持模块

use anyhow::Result;
use rig::{
    agent::{Agent, AgentBuilder},
    client::CompletionClient,
    completion::{CompletionModel, Prompt},
    providers::{
        anthropic, deepseek, gemini,
        gemini::completion::gemini_api_types::{AdditionalParameters, GenerationConfig},
        mistral, moonshot, ollama, openai, openrouter,
    },
};

use crate::config::{LLMConfig, LLMProvider};

/// 统一的Provider客户端枚举
#[derive(Clone)]
pub enum ProviderClient {
    OpenAI(openai::Client),
    Moonshot(moonshot::Client),
    DeepSeek(deepseek::Client),
    Mistral(mistral::Client),
    OpenRouter(openrouter::Client),
    Anthropic(anthropic::Client),
    Gemini(gemini::Client),
    Ollama(ollama::Client),
}

impl ProviderClient {
    /// 根据配置创建相应的provider客户端
    ///
    /// 只有 OpenAI 兼容的三家会使用 `api_base_url`，其余走各自的官方地址
    pub fn new(config: &LLMConfig) -> Result<Self> {
        let key = config.api_key.as_str();
        let base_url = config.api_base_url.as_str();

        let client = match config.provider {
            LLMProvider::OpenAI => {
                Self::OpenAI(openai::Client::builder(key).base_url(base_url).build())
            }
            LLMProvider::Moonshot => {
                Self::Moonshot(moonshot::Client::builder(key).base_url(base_url).build())
            }
            LLMProvider::DeepSeek => {
                Self::DeepSeek(deepseek::Client::builder(key).base_url(base_url).build())
            }
            LLMProvider::Mistral => Self::Mistral(mistral::Client::builder(key).build()),
            LLMProvider::OpenRouter => Self::OpenRouter(openrouter::Client::builder(key).build()),
            LLMProvider::Anthropic => {
                Self::Anthropic(anthropic::ClientBuilder::new(key).build()?)
            }
            LLMProvider::Gemini => Self::Gemini(gemini::Client::builder(key).build()?),
            // 本地模型无需密钥
            LLMProvider::Ollama => Self::Ollama(ollama::Client::builder().build()),
        };
        Ok(client)
    }

    /// 创建不带工具的单轮对话Agent
    pub fn create_agent(
        &self,
        model: &str,
        system_prompt: &str,
        config: &LLMConfig,
    ) -> Result<ProviderAgent> {
        let agent = match self {
            Self::OpenAI(client) => ProviderAgent::OpenAI(single_turn(
                client
                    .completion_model(model)
                    .completions_api()
                    .into_agent_builder(),
                system_prompt,
                config,
            )),
            Self::Moonshot(client) => {
                ProviderAgent::Moonshot(single_turn(client.agent(model), system_prompt, config))
            }
            Self::DeepSeek(client) => {
                ProviderAgent::DeepSeek(single_turn(client.agent(model), system_prompt, config))
            }
            Self::Mistral(client) => {
                ProviderAgent::Mistral(single_turn(client.agent(model), system_prompt, config))
            }
            Self::OpenRouter(client) => {
                ProviderAgent::OpenRouter(single_turn(client.agent(model), system_prompt, config))
            }
            Self::Anthropic(client) => {
                ProviderAgent::Anthropic(single_turn(client.agent(model), system_prompt, config))
            }
            Self::Gemini(client) => {
                // Gemini 要求显式的 generation config
                let params =
                    AdditionalParameters::default().with_config(GenerationConfig::default());
                let builder = client
                    .agent(model)
                    .additional_params(serde_json::to_value(params)?);
                ProviderAgent::Gemini(single_turn(builder, system_prompt, config))
            }
            Self::Ollama(client) => {
                ProviderAgent::Ollama(single_turn(client.agent(model), system_prompt, config))
            }
        };
        Ok(agent)
    }
}

/// 对比与README生成共用的Agent参数：系统提示词、最大tokens、温度
fn single_turn<M: CompletionModel>(
    builder: AgentBuilder<M>,
    system_prompt: &str,
    config: &LLMConfig,
) -> Agent<M> {
    builder
        .preamble(system_prompt)
        .max_tokens(config.max_tokens.into())
        .temperature(config.temperature)
        .build()
}

/// 统一的Agent枚举
pub enum ProviderAgent {
    OpenAI(Agent<openai::CompletionModel>),
    Mistral(Agent<mistral::CompletionModel>),
    OpenRouter(Agent<openrouter::CompletionModel>),
    Anthropic(Agent<anthropic::completion::CompletionModel>),
    Gemini(Agent<gemini::completion::CompletionModel>),
    Moonshot(Agent<moonshot::CompletionModel>),
    DeepSeek(Agent<deepseek::CompletionModel>),
    Ollama(Agent<ollama::CompletionModel<reqwest::Client>>),
}

impl ProviderAgent {
    /// 执行prompt
    pub async fn prompt(&self, prompt: &str) -> Result<String> {
        let output = match self {
            Self::OpenAI(agent) => agent.prompt(prompt).await?,
            Self::Moonshot(agent) => agent.prompt(prompt).await?,
            Self::DeepSeek(agent) => agent.prompt(prompt).await?,
            Self::Mistral(agent) => agent.prompt(prompt).await?,
            Self::OpenRouter(agent) => agent.prompt(prompt).await?,
            Self::Anthropic(agent) => agent.prompt(prompt).await?,
            Self::Gemini(agent) => agent.prompt(prompt).await?,
            Self::Ollama(agent) => agent.prompt(prompt).await?,
        };
        Ok(output)
    }
}
