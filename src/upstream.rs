use crate::config::UpstreamConfig;
use crate::protocol::UpstreamRequest;
use axum::http::StatusCode;
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
pub enum UpstreamCallError {
    #[error("upstream timed out after {0} ms")]
    Timeout(u64),
    #[error("upstream connection failed: {0}")]
    Connect(String),
    #[error("upstream transport error: {0}")]
    Transport(String),
}

impl UpstreamCallError {
    fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            UpstreamCallError::Timeout(timeout_ms)
        } else if err.is_connect() {
            UpstreamCallError::Connect(err.to_string())
        } else {
            UpstreamCallError::Transport(err.to_string())
        }
    }
}

/// Raw upstream reply. Status mapping is left to the caller.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub text: String,
    pub elapsed: Duration,
}

pub async fn call_chat_completions(
    client: &reqwest::Client,
    cfg: &UpstreamConfig,
    body: &UpstreamRequest,
) -> Result<UpstreamReply, UpstreamCallError> {
    let started = Instant::now();
    let resp = client
        .post(&cfg.url)
        .timeout(Duration::from_millis(cfg.timeout_ms))
        .bearer_auth(cfg.credential.bearer())
        .json(body)
        .send()
        .await
        .map_err(|err| UpstreamCallError::from_reqwest(err, cfg.timeout_ms))?;
    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|err| UpstreamCallError::from_reqwest(err, cfg.timeout_ms))?;
    Ok(UpstreamReply {
        status,
        text,
        elapsed: started.elapsed(),
    })
}
