use crate::error::{AppError, AppResult};
use serde::Serialize;
use serde_json::Value;

/// The parts of a device request the relay reads. Everything else in the
/// body (`role`, later messages, unknown keys) is ignored.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InboundRequest {
    pub user_message: String,
    /// Accepted for compatibility; the relay never streams.
    pub stream: Option<bool>,
}

impl InboundRequest {
    /// Content of the first message, or `""` when there is none.
    pub fn user_message(&self) -> &str {
        &self.user_message
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundResponse {
    pub result: String,
    pub usage: Value,
}

pub fn decode_request(body: &[u8]) -> AppResult<InboundRequest> {
    let value: Value = serde_json::from_slice(body).map_err(AppError::malformed_input)?;
    let Some(obj) = value.as_object() else {
        return Err(AppError::malformed_input("request body must be a JSON object"));
    };

    let first = match obj.get("messages") {
        None | Some(Value::Null) => None,
        Some(Value::Array(messages)) => messages.first(),
        Some(_) => return Err(AppError::malformed_input("`messages` must be an array")),
    };
    let content = match first {
        None => None,
        Some(Value::Object(message)) => message.get("content"),
        Some(_) => {
            return Err(AppError::malformed_input(
                "`messages[0]` must be an object",
            ));
        }
    };
    let user_message = match content {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(_) => {
            return Err(AppError::malformed_input(
                "`messages[0].content` must be a string",
            ));
        }
    };

    Ok(InboundRequest {
        user_message,
        stream: obj.get("stream").and_then(|v| v.as_bool()),
    })
}
