use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

pub const AUTH_FAILED_ERROR: &str = "Authentication failed";
pub const AUTH_FAILED_MESSAGE: &str = "请检查讯飞凭证是否正确";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedInput,
    RequestFailed,
    SchemaMismatch,
    AuthenticationFailed,
    UpstreamError,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MalformedInput => "malformed_input",
            ErrorKind::RequestFailed => "request_failed",
            ErrorKind::SchemaMismatch => "schema_mismatch",
            ErrorKind::AuthenticationFailed => "authentication_failed",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::Internal => "internal",
        }
    }
}

/// A failed relay, rendered as the device error envelope.
///
/// `RequestFailed`, `SchemaMismatch` and `Internal` all surface as 500: the
/// device firmware only branches on 200/401/other, so the kind is kept for
/// logs and metrics rather than encoded in the status.
#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub kind: ErrorKind,
    pub message: String,
    pub detail: Option<Value>,
}

impl AppError {
    pub fn new(status: StatusCode, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn malformed_input(err: impl ToString) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorKind::MalformedInput,
            "Malformed request body",
        )
        .with_detail(err.to_string())
    }

    pub fn request_failed(err: impl ToString) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::RequestFailed,
            "Request failed",
        )
        .with_detail(err.to_string())
    }

    pub fn schema_mismatch() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::SchemaMismatch,
            "response format error",
        )
    }

    pub fn authentication_failed() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ErrorKind::AuthenticationFailed,
            AUTH_FAILED_ERROR,
        )
    }

    pub fn upstream_status(status: StatusCode) -> Self {
        Self::new(
            status,
            ErrorKind::UpstreamError,
            format!("XFyun API error: {}", status.as_u16()),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ErrorKind::Internal, message)
    }

    pub fn body(&self) -> Value {
        let envelope = match self.kind {
            ErrorKind::AuthenticationFailed => ErrorEnvelope {
                error: &self.message,
                message: Some(AUTH_FAILED_MESSAGE),
                detail: None,
            },
            _ => ErrorEnvelope {
                error: &self.message,
                message: None,
                detail: self.detail.as_ref(),
            },
        };
        serde_json::to_value(envelope).unwrap_or_else(|_| serde_json::json!({ "error": self.message }))
    }
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a Value>,
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.kind.as_str())
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, axum::Json(self.body())).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
