use std::fmt;

pub const DEFAULT_UPSTREAM_URL: &str = "https://spark-api-open.xf-yun.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "4.0Ultra";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_SYSTEM_PROMPT: &str = "你是小石，一个友好的智能助手。请用简短的中文回答问题，不超过50字。回复中只使用中英文、数字和标点符号，不要使用表情符号、emoji或其他特殊符号。";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing credential: set SPARK_RELAY_API_PASSWORD or SPARK_RELAY_API_KEY and SPARK_RELAY_API_SECRET")]
    MissingCredential,
    #[error("invalid credential: expected `key:secret`")]
    InvalidCredential,
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Spark HTTP password: `APIKey:APISecret`, sent verbatim as the bearer value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        match raw.split_once(':') {
            Some((key, secret)) if !key.is_empty() && !secret.is_empty() => {
                Ok(Self(raw.to_string()))
            }
            _ => Err(ConfigError::InvalidCredential),
        }
    }

    pub fn from_parts(key: &str, secret: &str) -> Result<Self, ConfigError> {
        Self::parse(&format!("{}:{}", key.trim(), secret.trim()))
    }

    pub fn bearer(&self) -> &str {
        &self.0
    }

    /// The key half only; safe to log.
    pub fn hint(&self) -> &str {
        self.0.split(':').next().unwrap_or_default()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({}:***)", self.hint())
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub url: String,
    pub model: String,
    pub credential: Credential,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_ms: u64,
    /// Echo upstream bodies back to the device under `detail` on error paths.
    pub expose_upstream_detail: bool,
}

impl UpstreamConfig {
    pub fn new(credential: Credential) -> Self {
        Self {
            url: DEFAULT_UPSTREAM_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            credential,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            expose_upstream_detail: true,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let credential = match var("SPARK_RELAY_API_PASSWORD") {
            Some(password) => Credential::parse(&password)?,
            None => match (var("SPARK_RELAY_API_KEY"), var("SPARK_RELAY_API_SECRET")) {
                (Some(key), Some(secret)) => Credential::from_parts(&key, &secret)?,
                _ => return Err(ConfigError::MissingCredential),
            },
        };

        let mut cfg = Self::new(credential);
        if let Some(url) = var("SPARK_RELAY_UPSTREAM_URL") {
            cfg.url = url.trim().to_string();
        }
        if let Some(model) = var("SPARK_RELAY_MODEL") {
            cfg.model = model.trim().to_string();
        }
        if let Some(prompt) = var("SPARK_RELAY_SYSTEM_PROMPT") {
            cfg.system_prompt = prompt;
        }
        if let Some(raw) = var("SPARK_RELAY_TIMEOUT_MS") {
            cfg.timeout_ms = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "SPARK_RELAY_TIMEOUT_MS",
                    value: raw.clone(),
                })?;
        }
        if let Some(raw) = var("SPARK_RELAY_EXPOSE_UPSTREAM_DETAIL") {
            cfg.expose_upstream_detail =
                parse_bool(&raw).ok_or(ConfigError::InvalidValue {
                    name: "SPARK_RELAY_EXPOSE_UPSTREAM_DETAIL",
                    value: raw.clone(),
                })?;
        }
        Ok(cfg)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
