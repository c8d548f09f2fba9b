use crate::banner::CONVERSATION_PATH;
use crate::config::{ConfigError, UpstreamConfig};
use crate::error::{AppError, AppResult};
use axum::Router;
use axum::http::HeaderValue;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    HeaderName,
};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use std::any::Any;
use std::sync::{Arc, Once, OnceLock};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<RuntimeConfig>,
    pub http: reqwest::Client,
    pub metrics: PrometheusHandle,
    pub lan_ip: String,
}

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static METRICS_ERROR: OnceLock<AppError> = OnceLock::new();
static METRICS_INIT: Once = Once::new();

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub listen: String,
    pub metrics_path: String,
    pub upstream: UpstreamConfig,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen = std::env::var("SPARK_RELAY_LISTEN")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| format!("0.0.0.0:{DEFAULT_PORT}"));
        let metrics_path = std::env::var("SPARK_RELAY_METRICS_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "/metrics".to_string());
        Ok(Self {
            listen,
            metrics_path,
            upstream: UpstreamConfig::from_env()?,
        })
    }

    pub fn port(&self) -> u16 {
        self.listen
            .parse::<std::net::SocketAddr>()
            .map(|addr| addr.port())
            .unwrap_or(DEFAULT_PORT)
    }
}

pub async fn load_state() -> AppResult<AppState> {
    let runtime = RuntimeConfig::from_env().map_err(|err| AppError::internal(err.to_string()))?;
    load_state_with_runtime(runtime).await
}

pub async fn load_state_with_runtime(runtime: RuntimeConfig) -> AppResult<AppState> {
    let http = reqwest::Client::builder()
        .user_agent("spark-relay/0.1")
        .build()
        .map_err(|err| AppError::internal(format!("http client init failed: {err}")))?;

    let metrics = init_metrics()?;
    let lan_ip = crate::banner::local_ip();

    Ok(AppState {
        runtime: Arc::new(runtime),
        http,
        metrics,
        lan_ip,
    })
}

fn init_metrics() -> AppResult<PrometheusHandle> {
    METRICS_INIT.call_once(|| {
        match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                let _ = METRICS_HANDLE.set(handle);
            }
            Err(err) => {
                let _ = METRICS_ERROR.set(AppError::internal(format!(
                    "metrics init failed: {err}"
                )));
            }
        }
    });

    if let Some(err) = METRICS_ERROR.get() {
        return Err(err.clone());
    }
    METRICS_HANDLE
        .get()
        .cloned()
        .ok_or_else(|| AppError::internal("metrics recorder not available"))
}

pub fn build_app(state: AppState) -> Router {
    let metrics_path = state.runtime.metrics_path.clone();
    let router = Router::new()
        .route("/", get(crate::frontend::index))
        .route(
            CONVERSATION_PATH,
            post(crate::handlers::conversation).options(crate::handlers::conversation_preflight),
        )
        .route(
            "/test",
            get(crate::handlers::test_status).post(crate::handlers::test_echo),
        )
        .route(&metrics_path, get(crate::handlers::metrics))
        .fallback(crate::frontend::not_found)
        .with_state(state);
    apply_boundary_layers(router)
}

/// Middleware wrapped around every route, including the fallback.
pub fn apply_boundary_layers(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type,Authorization"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET,PUT,POST,DELETE,OPTIONS"),
        ))
}

/// Last line of defence: a panicking handler becomes a 500 `{error}` envelope.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "internal error".to_string()
    };
    tracing::error!(panic = %message, "request handler panicked");
    AppError::internal(message).into_response()
}
