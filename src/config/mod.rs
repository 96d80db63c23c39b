use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub(crate) const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub(crate) enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Runtime configuration injected by the hosting page as `window.ENV`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct EnvConfig {
    pub api_url: String,
    pub log_level: LogLevel,
}

impl EnvConfig {
    /// Reads `window.ENV`.
    ///
    /// Both `API_URL` / `LOG_LEVEL` and the lowercase spellings are accepted.
    pub fn new() -> Self {
        let api_url = env_string(&["API_URL", "api_url"]);
        let log_level = env_string(&["LOG_LEVEL", "log_level"]);
        Self::from_values(api_url, log_level)
    }

    pub fn from_values(api_url: Option<String>, log_level: Option<String>) -> Self {
        let api_url = api_url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let log_level = log_level
            .and_then(|l| l.trim().parse::<LogLevel>().ok())
            .unwrap_or_default();

        Self { api_url, log_level }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::from_values(None, None)
    }
}

fn env_string(keys: &[&str]) -> Option<String> {
    let env = web_sys::window()?.get("ENV")?;
    if env.is_undefined() || !env.is_object() {
        return None;
    }
    keys.iter().find_map(|k| {
        js_sys::Reflect::get(&env, &(*k).into())
            .ok()
            .and_then(|v| v.as_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_env_is_missing() {
        let c = EnvConfig::from_values(None, None);
        assert_eq!(c.api_url, DEFAULT_API_URL);
        assert_eq!(c.log_level, LogLevel::Info);
    }

    #[test]
    fn test_api_url_trailing_slash_is_trimmed() {
        let c = EnvConfig::from_values(Some("https://notes.example.com/".to_string()), None);
        assert_eq!(c.api_url, "https://notes.example.com");
    }

    #[test]
    fn test_blank_api_url_falls_back_to_default() {
        let c = EnvConfig::from_values(Some("   ".to_string()), None);
        assert_eq!(c.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_log_level_parses_case_insensitively() {
        let c = EnvConfig::from_values(None, Some("DEBUG".to_string()));
        assert_eq!(c.log_level, LogLevel::Debug);
        assert_eq!(c.log_level.as_ref(), "debug");

        let bad = EnvConfig::from_values(None, Some("loud".to_string()));
        assert_eq!(bad.log_level, LogLevel::Info);
    }
}
