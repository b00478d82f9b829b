use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{DEFAULT_HISTORY_URL, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_MS};
use crate::store::STATE_FILENAME;

pub const STATE_DIR_NAME: &str = ".sweacopy";
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Flag,
    Env,
    Default,
}

impl ValueSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Env => "env",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub state_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub state_dir: PathBuf,
    pub config_path: PathBuf,
    pub state_path: PathBuf,
    pub state_source: ValueSource,
    pub config_source: ValueSource,
}

impl ResolvedPaths {
    pub fn diagnostics(&self) -> String {
        format!(
            "state_dir={} ({})\nconfig_path={} ({})\nstate_path={}",
            normalize_for_display(&self.state_dir),
            self.state_source.as_str(),
            normalize_for_display(&self.config_path),
            self.config_source.as_str(),
            normalize_for_display(&self.state_path),
        )
    }
}

#[derive(Debug, Clone)]
pub struct InitReport {
    pub created_state_dir: bool,
    pub wrote_config: bool,
}

pub fn resolve_paths(cwd: &Path, overrides: &PathOverrides) -> ResolvedPaths {
    resolve_paths_with_lookup(cwd, overrides, |key| env::var(key).ok())
}

fn resolve_paths_with_lookup<F>(cwd: &Path, overrides: &PathOverrides, lookup_env: F) -> ResolvedPaths
where
    F: Fn(&str) -> Option<String>,
{
    let (state_dir, state_source) = if let Some(path) = overrides.state_dir.as_deref() {
        (absolutize(path, cwd), ValueSource::Flag)
    } else if let Some(value) = non_blank_env(&lookup_env, "SWEACOPY_STATE_DIR") {
        (absolutize(Path::new(&value), cwd), ValueSource::Env)
    } else {
        (cwd.join(STATE_DIR_NAME), ValueSource::Default)
    };

    let (config_path, config_source) = if let Some(path) = overrides.config.as_deref() {
        (absolutize(path, cwd), ValueSource::Flag)
    } else if let Some(value) = non_blank_env(&lookup_env, "SWEACOPY_CONFIG") {
        (absolutize(Path::new(&value), cwd), ValueSource::Env)
    } else {
        (state_dir.join(CONFIG_FILENAME), ValueSource::Default)
    };

    ResolvedPaths {
        state_path: state_dir.join(STATE_FILENAME),
        state_dir,
        config_path,
        state_source,
        config_source,
    }
}

fn non_blank_env<F>(lookup_env: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup_env(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Create the state directory and a commented config file.
pub fn init_layout(paths: &ResolvedPaths, force: bool) -> Result<InitReport> {
    let created_state_dir = !paths.state_dir.exists();
    if created_state_dir {
        fs::create_dir_all(&paths.state_dir)
            .with_context(|| format!("failed to create {}", paths.state_dir.display()))?;
    }
    let wrote_config = write_text_file(&paths.config_path, &render_materialized_config(), force)?;
    Ok(InitReport {
        created_state_dir,
        wrote_config,
    })
}

pub fn render_materialized_config() -> String {
    format!(
        "# sweacopy configuration (materialized by `sweacopy init`)\n# Environment variables SWEA_HISTORY_URL, SWEA_PAGE_URL, SWEA_COOKIE,\n# SWEA_USER_AGENT and SWEA_HTTP_TIMEOUT_MS override these values.\n\n[swea]\n# Endpoint the history form posts to when the page has no form.\nhistory_url = \"{DEFAULT_HISTORY_URL}\"\n# Page loaded as the current page when neither --page nor --url is given.\n# page_url = \"{DEFAULT_HISTORY_URL}?contestProbId=...\"\npage_size = {DEFAULT_PAGE_SIZE}\n# user_agent = \"sweacopy/0.2\"\n# Session cookie copied from a logged-in browser, sent as-is.\n# cookie = \"JSESSIONID=...\"\ntimeout_ms = {DEFAULT_TIMEOUT_MS}\n",
    )
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn write_text_file(path: &Path, content: &str, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }

    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("path has no parent: {}", path.display()))?;
    fs::create_dir_all(parent)
        .with_context(|| format!("failed to create parent directory {}", parent.display()))?;
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

pub fn normalize_for_display(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
