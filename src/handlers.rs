use crate::app::AppState;
use crate::config::UpstreamConfig;
use crate::error::{AppError, AppResult, ErrorKind};
use crate::protocol::{OutboundResponse, device, spark};
use crate::upstream::{self, UpstreamReply};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde_json::{Value, json};

const TEST_MESSAGE: &str = "relay is working";

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.render()
}

pub async fn conversation(State(state): State<AppState>, body: Bytes) -> Response {
    let outcome = relay_conversation(&state, &body).await;
    let label = match &outcome {
        Ok(_) => "ok",
        Err(err) => err.kind.as_str(),
    };
    metrics::counter!("relay_conversation_requests_total", "outcome" => label).increment(1);

    match outcome {
        Ok(out) => {
            tracing::debug!(result = %out.result, "reply sent to device");
            (StatusCode::OK, Json(out)).into_response()
        }
        Err(err) => {
            if err.status.is_server_error() {
                tracing::error!(kind = err.kind.as_str(), status = err.status.as_u16(), "{}", err.message);
            } else {
                tracing::warn!(kind = err.kind.as_str(), status = err.status.as_u16(), "{}", err.message);
            }
            err.into_response()
        }
    }
}

pub async fn conversation_preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn test_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": TEST_MESSAGE,
        "api_url": state.runtime.upstream.url,
    }))
}

pub async fn test_echo(body: Bytes) -> Json<Value> {
    let echo = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
    tracing::info!(echo = %echo, "test request");
    Json(json!({
        "status": "ok",
        "echo": echo,
        "message": TEST_MESSAGE,
    }))
}

/// Device body in, device envelope out. One upstream attempt, no retries.
pub async fn relay_conversation(state: &AppState, body: &[u8]) -> AppResult<OutboundResponse> {
    let cfg = &state.runtime.upstream;
    let inbound = device::decode_request(body)?;
    let user_message = inbound.user_message();
    tracing::debug!(user_message, "device request");

    let req = spark::encode_request(cfg, user_message);
    tracing::info!(
        url = %cfg.url,
        model = %cfg.model,
        credential = cfg.credential.hint(),
        "forwarding to upstream"
    );

    let reply = upstream::call_chat_completions(&state.http, cfg, &req)
        .await
        .map_err(AppError::request_failed)?;
    metrics::histogram!("relay_upstream_duration_seconds").record(reply.elapsed.as_secs_f64());
    tracing::info!(
        status = reply.status.as_u16(),
        elapsed_ms = reply.elapsed.as_millis() as u64,
        "upstream replied"
    );

    map_reply(reply, cfg)
}

fn map_reply(reply: UpstreamReply, cfg: &UpstreamConfig) -> AppResult<OutboundResponse> {
    let result = match reply.status {
        StatusCode::OK => spark::decode_response(&reply.text),
        StatusCode::UNAUTHORIZED => Err(AppError::authentication_failed()),
        status => Err(AppError::upstream_status(status).with_detail(reply.text)),
    };
    result.map_err(|err| redact_upstream_detail(err, cfg))
}

fn redact_upstream_detail(mut err: AppError, cfg: &UpstreamConfig) -> AppError {
    let echoes_upstream = matches!(err.kind, ErrorKind::SchemaMismatch | ErrorKind::UpstreamError);
    if echoes_upstream && !cfg.expose_upstream_detail {
        err.detail = None;
    }
    err
}
