//! Service configuration loaded from environment variables.

use std::time::Duration;

use crate::pipeline::types::Theme;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Build from environment variables.
///
/// | Env Var | Default | Purpose |
/// |---------|---------|---------|
/// | `PORT` | 8080 | HTTP listen port |
/// | `LAYOUT_DEFAULT_THEME` | `professional` | Theme when the request has none |
/// | `REQUEST_TIMEOUT_S` | 30 | Per-request deadline |
/// | `RATE_LIMIT_PER_MINUTE` | 0 (disabled) | Analytics requests per minute |
/// | `CHART_DATA_BASE_URL` | (empty = same origin) | Base URL the editor posts saved data to |
///
/// LLM variables (`LLM_API_KEY`, `LLM_BASE_URL`, `LLM_MODEL`,
/// `INSIGHT_SOFT_TIMEOUT_S`) are read by the insight generator.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub default_theme: Theme,
    pub request_timeout: Duration,
    pub rate_limit_per_minute: u32,
    pub chart_data_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            default_theme: Theme::Professional,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            rate_limit_per_minute: 0,
            chart_data_base_url: String::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = env_parse("PORT").unwrap_or(defaults.port);
        let default_theme = std::env::var("LAYOUT_DEFAULT_THEME")
            .ok()
            .and_then(|v| Theme::parse(&v))
            .unwrap_or(defaults.default_theme);
        let request_timeout = env_parse("REQUEST_TIMEOUT_S")
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);
        let rate_limit_per_minute =
            env_parse("RATE_LIMIT_PER_MINUTE").unwrap_or(defaults.rate_limit_per_minute);
        let chart_data_base_url = std::env::var("CHART_DATA_BASE_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.chart_data_base_url);

        Self {
            port,
            default_theme,
            request_timeout,
            rate_limit_per_minute,
            chart_data_base_url,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
