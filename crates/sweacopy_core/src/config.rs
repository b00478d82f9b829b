use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_URL: &str =
    "https://swexpertacademy.com/main/talk/solvingClub/problemSubmitHistory.do";
pub const DEFAULT_USER_AGENT: &str = "sweacopy/0.2";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct SweaConfig {
    #[serde(default)]
    pub swea: SweaSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct SweaSection {
    pub history_url: Option<String>,
    pub page_url: Option<String>,
    pub page_size: Option<u32>,
    pub user_agent: Option<String>,
    pub cookie: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl SweaConfig {
    /// Endpoint used when the current page carries no usable query form:
    /// env SWEA_HISTORY_URL > config > DEFAULT_HISTORY_URL.
    pub fn history_url(&self) -> String {
        self.history_url_with_lookup(|key| env::var(key).ok())
    }

    /// Page loaded as the current page when no source is given:
    /// env SWEA_PAGE_URL > config > None.
    pub fn page_url(&self) -> Option<String> {
        self.page_url_with_lookup(|key| env::var(key).ok())
    }

    /// Session cookie header value: env SWEA_COOKIE > config > None.
    pub fn cookie(&self) -> Option<String> {
        env_value(&|key| env::var(key).ok(), "SWEA_COOKIE").or_else(|| non_blank(&self.swea.cookie))
    }

    /// Resolve user agent: env SWEA_USER_AGENT > config > DEFAULT_USER_AGENT.
    pub fn user_agent(&self) -> String {
        env_value(&|key| env::var(key).ok(), "SWEA_USER_AGENT")
            .or_else(|| non_blank(&self.swea.user_agent))
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    /// Resolve HTTP timeout: env SWEA_HTTP_TIMEOUT_MS > config > DEFAULT_TIMEOUT_MS.
    pub fn timeout_ms(&self) -> u64 {
        env_value(&|key| env::var(key).ok(), "SWEA_HTTP_TIMEOUT_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .or(self.swea.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    /// `pageSize` sent when the query form leaves it empty.
    pub fn page_size(&self) -> u32 {
        self.swea
            .page_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    fn history_url_with_lookup<F>(&self, lookup_env: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        env_value(&lookup_env, "SWEA_HISTORY_URL")
            .or_else(|| non_blank(&self.swea.history_url))
            .unwrap_or_else(|| DEFAULT_HISTORY_URL.to_string())
    }

    fn page_url_with_lookup<F>(&self, lookup_env: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        env_value(&lookup_env, "SWEA_PAGE_URL").or_else(|| non_blank(&self.swea.page_url))
    }
}

fn env_value<F>(lookup_env: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup_env(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

/// Load and parse a SweaConfig from a TOML file. Returns default if file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<SweaConfig> {
    if !config_path.exists() {
        return Ok(SweaConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: SweaConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(parsed)
}
