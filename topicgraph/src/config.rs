//! Session configuration: minimum child count, completion endpoint and credential.
//!
//! Loaded once at startup (after the `config` crate has applied `.env` and XDG values to
//! the process environment) and immutable for the session.

use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "chatgpt-4o-latest";
pub const DEFAULT_MIN_CHILDREN: u32 = 1;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Explorer settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ExplorerConfig {
    /// Minimum number of children requested per discovery.
    pub min_children: u32,
    /// Chat completions base URL (without `/chat/completions`).
    pub api_base: String,
    /// Bearer credential; `None` leaves the client's own default (`OPENAI_API_KEY`).
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            min_children: DEFAULT_MIN_CHILDREN,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl ExplorerConfig {
    /// Reads settings from the process environment.
    ///
    /// | variable | field |
    /// |----------|-------|
    /// | `TOPICGRAPH_MIN_CHILDREN` | `min_children` |
    /// | `OPENAI_BASE_URL` or `OPENAI_API_BASE` | `api_base` |
    /// | `OPENAI_API_KEY` | `api_key` |
    /// | `OPENAI_MODEL` | `model` |
    /// | `TOPICGRAPH_TEMPERATURE` | `temperature` |
    /// | `TOPICGRAPH_MAX_TOKENS` | `max_tokens` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = get("TOPICGRAPH_MIN_CHILDREN") {
            config.min_children = parse_number("TOPICGRAPH_MIN_CHILDREN", &v)?;
        }
        if let Some(v) = get("OPENAI_BASE_URL").or_else(|| get("OPENAI_API_BASE")) {
            config.api_base = normalize_api_base(&v);
        }
        config.api_key = get("OPENAI_API_KEY");
        if let Some(v) = get("OPENAI_MODEL") {
            config.model = v.trim().to_string();
        }
        if let Some(v) = get("TOPICGRAPH_TEMPERATURE") {
            let t: f32 = parse_number("TOPICGRAPH_TEMPERATURE", &v)?;
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::InvalidValue {
                    key: "TOPICGRAPH_TEMPERATURE",
                    value: v,
                    reason: "must be between 0 and 2".to_string(),
                });
            }
            config.temperature = t;
        }
        if let Some(v) = get("TOPICGRAPH_MAX_TOKENS") {
            config.max_tokens = parse_number("TOPICGRAPH_MAX_TOKENS", &v)?;
        }
        Ok(config)
    }
}

/// Accepts either a base URL or a full `.../chat/completions` endpoint.
pub fn normalize_api_base(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    url.strip_suffix("/chat/completions")
        .unwrap_or(url)
        .to_string()
}

fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: e.to_string(),
        })
}
