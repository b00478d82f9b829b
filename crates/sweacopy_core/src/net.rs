use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Url;
use reqwest::blocking::{Client, ClientBuilder, RequestBuilder};
use tracing::debug;

use crate::config::SweaConfig;
use crate::page::Page;
use crate::search::PageFetcher;

const PAGE_INDEX_PARAM: &str = "pageIndex";
const PAGE_SIZE_PARAM: &str = "pageSize";

/// Where the current page comes from.
#[derive(Debug, Clone)]
pub enum PageSource {
    File(PathBuf),
    Url(String),
}

/// Blocking client carrying the session cookie and user agent on every call.
pub struct HistoryClient {
    client: Client,
    user_agent: String,
    cookie: Option<String>,
}

impl HistoryClient {
    pub fn from_config(config: &SweaConfig) -> Result<Self> {
        Self::from_builder(Client::builder(), config)
    }

    fn from_builder(builder: ClientBuilder, config: &SweaConfig) -> Result<Self> {
        let client = builder
            .timeout(Duration::from_millis(config.timeout_ms()))
            .cookie_store(true)
            .build()
            .context("failed to build history HTTP client")?;
        Ok(Self {
            client,
            user_agent: config.user_agent(),
            cookie: config.cookie(),
        })
    }

    fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header("User-Agent", self.user_agent.clone())
            .header("Accept", "text/html,application/xhtml+xml;q=0.9,*/*;q=0.1");
        match &self.cookie {
            Some(cookie) => request.header("Cookie", cookie.clone()),
            None => request,
        }
    }

    fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .decorate(self.client.get(url))
            .send()
            .with_context(|| format!("failed to fetch {url}"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("HTTP {} while fetching {}", status.as_u16(), url);
        }
        response.text().context("failed to read response body")
    }

    fn post_form(&self, url: &str, params: &[(String, String)]) -> Result<String> {
        let response = self
            .decorate(self.client.post(url))
            .form(params)
            .send()
            .with_context(|| format!("failed to post to {url}"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("HTTP {} while posting to {}", status.as_u16(), url);
        }
        response.text().context("failed to read response body")
    }
}

/// Load and parse the page the search starts from.
///
/// Saved files are resolved against `fallback_base` so a relative form
/// action still points at the judge.
pub fn load_current_page(
    client: &HistoryClient,
    source: &PageSource,
    fallback_base: &str,
) -> Result<Page> {
    match source {
        PageSource::File(path) => {
            let markup = read_markup(path)?;
            Ok(Page::parse(&markup, Url::parse(fallback_base).ok()))
        }
        PageSource::Url(url) => {
            let base = Url::parse(url).with_context(|| format!("invalid page url: {url}"))?;
            let markup = client.get_text(url)?;
            Ok(Page::parse(&markup, Some(base)))
        }
    }
}

fn read_markup(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Posts the current page's query form once per requested page index.
pub struct HistoryFetcher<'a> {
    client: &'a HistoryClient,
    endpoint: String,
    fields: Vec<(String, String)>,
    page_size: u32,
}

impl<'a> HistoryFetcher<'a> {
    pub fn for_page(client: &'a HistoryClient, current: &Page, config: &SweaConfig) -> Self {
        Self {
            client,
            endpoint: current.submit_url(&config.history_url()),
            fields: current.form_fields().to_vec(),
            page_size: config.page_size(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl PageFetcher for HistoryFetcher<'_> {
    fn fetch(&self, page_index: u32) -> Result<String> {
        let params = build_page_params(&self.fields, page_index, self.page_size);
        debug!(page = page_index, endpoint = %self.endpoint, "requesting history page");
        self.client.post_form(&self.endpoint, &params)
    }
}

/// Clone the form fields, force `pageIndex`, and default an empty `pageSize`.
pub fn build_page_params(
    fields: &[(String, String)],
    page_index: u32,
    default_page_size: u32,
) -> Vec<(String, String)> {
    let mut params = Vec::with_capacity(fields.len() + 2);
    for (key, value) in fields {
        set_param(&mut params, key, value);
    }
    set_param(&mut params, PAGE_INDEX_PARAM, &page_index.to_string());

    let has_page_size = params
        .iter()
        .any(|(key, value)| key == PAGE_SIZE_PARAM && !value.is_empty());
    if !has_page_size {
        set_param(&mut params, PAGE_SIZE_PARAM, &default_page_size.to_string());
    }
    params
}

/// Replace the first pair named `key` and drop later duplicates, or append.
fn set_param(params: &mut Vec<(String, String)>, key: &str, value: &str) {
    match params.iter().position(|(name, _)| name == key) {
        Some(index) => {
            params[index].1 = value.to_string();
            let mut seen = 0usize;
            params.retain(|(name, _)| {
                if name != key {
                    return true;
                }
                seen += 1;
                seen == 1
            });
        }
        None => params.push((key.to_string(), value.to_string())),
    }
}
