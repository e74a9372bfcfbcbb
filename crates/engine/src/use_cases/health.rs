//! LLM connectivity probe.

use std::sync::Arc;

use serde::Serialize;

use crate::infrastructure::ports::{LlmPort, LlmRequest};

const PROBE_PROMPT: &str = "Test message";
const REPLY_PREVIEW_CHARS: usize = 50;
const ERROR_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmStatus {
    pub success: bool,
    pub mock_mode: bool,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Sends one short prompt to the live model. In mock mode there is no model
/// to reach and the probe reports success without a call.
pub struct LlmStatusProbe {
    llm: Option<Arc<dyn LlmPort>>,
    model: String,
}

impl LlmStatusProbe {
    pub fn live(llm: Arc<dyn LlmPort>, model: impl Into<String>) -> Self {
        Self {
            llm: Some(llm),
            model: model.into(),
        }
    }

    pub fn mock(model: impl Into<String>) -> Self {
        Self {
            llm: None,
            model: model.into(),
        }
    }

    pub async fn check(&self) -> LlmStatus {
        let Some(llm) = &self.llm else {
            return LlmStatus {
                success: true,
                mock_mode: true,
                model: self.model.clone(),
                response: None,
                error: None,
            };
        };

        match llm.generate(LlmRequest::prompt(PROBE_PROMPT)).await {
            Ok(reply) => LlmStatus {
                success: true,
                mock_mode: false,
                model: self.model.clone(),
                response: Some(reply.content.chars().take(REPLY_PREVIEW_CHARS).collect()),
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, model = %self.model, "LLM status probe failed");
                LlmStatus {
                    success: false,
                    mock_mode: false,
                    model: self.model.clone(),
                    response: None,
                    error: Some(e.to_string().chars().take(ERROR_PREVIEW_CHARS).collect()),
                }
            }
        }
    }
}
