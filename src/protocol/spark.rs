use crate::config::UpstreamConfig;
use crate::error::{AppError, AppResult};
use crate::protocol::device::OutboundResponse;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// The system prompt always goes first, followed by the device's message.
pub fn encode_request(cfg: &UpstreamConfig, user_message: &str) -> UpstreamRequest {
    UpstreamRequest {
        model: cfg.model.clone(),
        messages: vec![
            ChatMessage::system(cfg.system_prompt.clone()),
            ChatMessage::user(user_message),
        ],
        stream: false,
        max_tokens: cfg.max_tokens,
        temperature: cfg.temperature,
    }
}

/// Reshape a 200 body into the device envelope.
pub fn decode_response(text: &str) -> AppResult<OutboundResponse> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| AppError::internal(format!("upstream body is not JSON: {err}")))?;

    let Some(first) = value
        .get("choices")
        .and_then(|v| v.as_array())
        .and_then(|choices| choices.first())
    else {
        return Err(AppError::schema_mismatch().with_detail(value));
    };

    let result = first
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| AppError::internal("upstream choice has no message.content"))?
        .to_string();
    let usage = value.get("usage").cloned().unwrap_or_else(|| json!({}));

    Ok(OutboundResponse { result, usage })
}
