use serde_json::json;
use std::fmt::Display;

use crate::i18n::TargetLanguage;
use crate::llm::TextGenerator;
use crate::logging::RequestLog;

/// 生成阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Comparison,
    Document,
}

impl Display for GenerationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            GenerationStage::Comparison => "comparison",
            GenerationStage::Document => "README",
        };
        write!(f, "{}", str)
    }
}

/// 生成结果
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub text: String,
    /// 模型不可用，使用了兜底模板
    pub used_fallback: bool,
}

/// Prompt模板配置
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// 系统提示词
    pub system_prompt: String,
    /// 开头的说明性指令
    pub opening_instruction: String,
    /// 结尾的强调性指令
    pub closing_instruction: String,
}

impl PromptTemplate {
    /// 拼装用户提示词：开头指令、数据正文、结尾指令、语言要求
    pub fn build_user_prompt(&self, body: &str, language: &TargetLanguage) -> String {
        format!(
            "{}\n\n{}\n\n{}\n\n{}",
            self.opening_instruction,
            body.trim_end(),
            self.closing_instruction,
            language.prompt_instruction()
        )
    }

    /// 调用模型生成；任何失败都记录错误日志并改用 `fallback` 渲染
    pub async fn generate_or_fallback<F>(
        &self,
        llm: &dyn TextGenerator,
        stage: GenerationStage,
        user_prompt: &str,
        log: &RequestLog,
        fallback: F,
    ) -> GenerationOutcome
    where
        F: FnOnce() -> String,
    {
        log.info(format!("Generating {} with the language model", stage));

        match llm.generate(&self.system_prompt, user_prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                log.info(format!("Generated {} with the language model", stage));
                GenerationOutcome {
                    text,
                    used_fallback: false,
                }
            }
            Ok(_) => {
                log.error_with(
                    format!("Language model returned no {}, using template", stage),
                    json!({ "stage": stage.to_string() }),
                );
                GenerationOutcome {
                    text: fallback(),
                    used_fallback: true,
                }
            }
            Err(err) => {
                log.error_with(
                    format!("Failed to generate {}, using template", stage),
                    json!({ "stage": stage.to_string(), "error": format!("{:#}", err) }),
                );
                GenerationOutcome {
                    text: fallback(),
                    used_fallback: true,
                }
            }
        }
    }
}
