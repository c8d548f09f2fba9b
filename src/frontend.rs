use crate::app::AppState;
use crate::banner;
use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

pub async fn index(State(state): State<AppState>) -> Response {
    let page = render_index(
        &state.runtime.upstream.url,
        &banner::device_url(&state.lan_ip, state.runtime.port()),
    );
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime::TEXT_HTML_UTF_8.as_ref())
        .body(Body::from(page))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

pub fn render_index(upstream_url: &str, device_url: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Spark relay</title></head>
<body>
    <h1>Spark relay is running</h1>
    <p><strong>Upstream endpoint:</strong> {upstream}</p>
    <p><strong>Device endpoint:</strong> {device}</p>
    <h2>Try it</h2>
    <pre>curl -X POST {device} \
  -H "Content-Type: application/json" \
  -d '{{"messages":[{{"role":"user","content":"你是谁"}}],"stream":false}}'</pre>
    <p>Request logs are written to the relay's stdout.</p>
</body>
</html>
"#,
        upstream = escape_html(upstream_url),
        device = escape_html(device_url),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
