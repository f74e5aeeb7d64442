//! 对比请求的错误类型及其HTTP响应形式

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::config::{API_KEY_ENV, ApiKeyProblem};
use crate::logging::LogEntry;

/// 对外可见的对比错误
///
/// 数据源与生成阶段的失败都在内部降级处理，不会出现在这里。
#[derive(Debug, Error)]
pub enum CompareError {
    /// 请求缺少必要参数（400）
    #[error("invalid request: {0}")]
    Validation(String),

    /// 模型凭据缺失或为占位值（500），附带修复步骤
    #[error("configuration error: {details}")]
    Configuration {
        details: String,
        instructions: Vec<String>,
    },

    /// 未预料的失败（500），附带已记录的日志
    #[error("unexpected failure: {details}")]
    Unexpected {
        details: String,
        logs: Vec<LogEntry>,
    },
}

impl CompareError {
    pub fn validation(details: impl Into<String>) -> Self {
        CompareError::Validation(details.into())
    }

    /// 根据API KEY问题构造配置错误
    pub fn missing_api_key(problem: ApiKeyProblem) -> Self {
        let details = match problem {
            ApiKeyProblem::Missing => "The language model API key is not set.",
            ApiKeyProblem::Placeholder => {
                "The language model API key is still the placeholder value from the example configuration."
            }
        };
        CompareError::Configuration {
            details: details.to_string(),
            instructions: vec![
                "Obtain an API key from your language model provider's dashboard.".to_string(),
                format!(
                    "Set it in the `{}` environment variable, or as `api_key` under `[llm]` in product-compare.toml.",
                    API_KEY_ENV
                ),
                "Make sure `provider` and `api_base_url` under `[llm]` match the key's provider.".to_string(),
                "Restart the server so the new configuration is loaded.".to_string(),
            ],
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CompareError::Validation(_) => StatusCode::BAD_REQUEST,
            CompareError::Configuration { .. } | CompareError::Unexpected { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for CompareError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            CompareError::Validation(details) => json!({
                "error": "Invalid request",
                "details": details,
            }),
            CompareError::Configuration {
                details,
                instructions,
            } => json!({
                "error": "Language model API key is not configured",
                "details": details,
                "instructions": instructions,
            }),
            CompareError::Unexpected { details, logs } => json!({
                "error": "Failed to compare products",
                "details": details,
                "logs": logs,
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            CompareError::validation("missing product1").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CompareError::missing_api_key(ApiKeyProblem::Missing).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            CompareError::Unexpected {
                details: "boom".to_string(),
                logs: Vec::new()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_configuration_error_lists_steps_in_order() {
        match CompareError::missing_api_key(ApiKeyProblem::Placeholder) {
            CompareError::Configuration {
                details,
                instructions,
            } => {
                assert!(details.contains("placeholder"));
                assert_eq!(instructions.len(), 4);
                assert!(instructions[1].contains(API_KEY_ENV));
                assert!(instructions[3].starts_with("Restart"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
