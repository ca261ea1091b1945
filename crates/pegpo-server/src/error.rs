//! 聊天请求错误
//!
//! 所有错误都是终止性的，不做重试。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use pegpo_core::IntakeError;
use pegpo_llm::LLMError;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("Invalid JSON body")]
    InvalidBody,

    #[error("Message is empty")]
    EmptyPrompt,

    #[error("POST required")]
    PostRequired,

    /// Provider 未编译或未知
    #[error("{0}")]
    ProviderUnavailable(String),

    /// 缺少凭证等配置
    #[error("{0}")]
    ConfigurationError(String),

    /// Provider 调用失败，`detail` 默认不返回给客户端
    #[error("Provider request failed")]
    ProviderRequestFailed { detail: String },
}

impl ChatError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody | Self::EmptyPrompt | Self::PostRequired => StatusCode::BAD_REQUEST,
            Self::ProviderUnavailable(_) | Self::ConfigurationError(_) | Self::ProviderRequestFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 转换 provider 错误，并记录完整信息
    ///
    /// 前置条件错误在发出请求前就已确定，其余都归为请求失败。
    pub fn from_llm(error: &LLMError) -> Self {
        if !error.is_precondition() {
            tracing::error!("Provider call failed: {}", error);
            return Self::ProviderRequestFailed {
                detail: error.to_string(),
            };
        }

        tracing::warn!("Provider not ready: {}", error);
        match error {
            LLMError::ProviderUnavailable(reason) => Self::ProviderUnavailable(reason.clone()),
            LLMError::Config(reason) => Self::ConfigurationError(reason.clone()),
            other => Self::ConfigurationError(other.to_string()),
        }
    }

    /// 发给客户端的错误文本（SSE 和 WebSocket 使用）
    pub fn client_message(&self, expose_detail: bool) -> String {
        match self {
            Self::ProviderRequestFailed { detail } if expose_detail => format!("{}: {}", self, detail),
            _ => self.to_string(),
        }
    }

    /// HTTP JSON 响应
    pub fn to_response(&self, expose_detail: bool) -> Response {
        let body = match self {
            Self::ProviderRequestFailed { detail } if expose_detail => json!({
                "error": self.to_string(),
                "detail": detail,
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<IntakeError> for ChatError {
    fn from(error: IntakeError) -> Self {
        match error {
            IntakeError::InvalidBody => Self::InvalidBody,
            IntakeError::EmptyPrompt => Self::EmptyPrompt,
        }
    }
}

impl From<LLMError> for ChatError {
    fn from(error: LLMError) -> Self {
        Self::from_llm(&error)
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        self.to_response(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ChatError::InvalidBody.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ChatError::EmptyPrompt.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ChatError::PostRequired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ChatError::ConfigurationError("GEMINI_API_KEY not found in environment".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_llm_error_mapping() {
        let error = ChatError::from(LLMError::Config("GEMINI_API_KEY not found in environment".into()));
        assert_eq!(error.to_string(), "GEMINI_API_KEY not found in environment");

        let error = ChatError::from(LLMError::ProviderUnavailable("Provider 'gemini' is disabled in config".into()));
        assert_eq!(error, ChatError::ProviderUnavailable("Provider 'gemini' is disabled in config".into()));

        let error = ChatError::from(LLMError::Api {
            status: 429,
            message: "quota".into(),
        });
        assert_eq!(error.to_string(), "Provider request failed");
        assert!(matches!(error, ChatError::ProviderRequestFailed { ref detail } if detail.contains("quota")));
    }

    #[test]
    fn test_detail_redaction() {
        let error = ChatError::ProviderRequestFailed {
            detail: "network error: reset".into(),
        };
        assert_eq!(error.client_message(false), "Provider request failed");
        assert_eq!(
            error.client_message(true),
            "Provider request failed: network error: reset"
        );
        assert_eq!(ChatError::EmptyPrompt.client_message(true), "Message is empty");
    }
}
