use std::fmt;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::locate::find_row;
use crate::page::{Page, SubmissionRow};

/// Retrieves the raw markup of one history page (1-based).
pub trait PageFetcher {
    fn fetch(&self, page_index: u32) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLabel {
    Current,
    Page(u32),
}

impl fmt::Display for PageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => write!(f, "current page"),
            Self::Page(index) => write!(f, "page {index}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub row: SubmissionRow,
    pub page: PageLabel,
}

/// Look for `nick` on the current page, then on history pages
/// `1..=end_page` in ascending order, one request at a time.
///
/// A page that fails to load is logged and skipped. `None` means no page
/// that could be read had a matching row.
pub fn search_all_pages(
    current: &Page,
    nick: &str,
    fetcher: &dyn PageFetcher,
) -> Option<SearchResult> {
    if let Some(row) = find_row(current, nick) {
        return Some(SearchResult {
            row: row.clone(),
            page: PageLabel::Current,
        });
    }

    let end_page = current.end_page();
    info!("'{nick}' not found on current page; searching pages 1..={end_page}");

    for page_index in 1..=end_page {
        let markup = match fetcher.fetch(page_index) {
            Ok(markup) => markup,
            Err(error) => {
                warn!(page = page_index, "fetch failed: {error:#}");
                continue;
            }
        };

        let page = Page::parse(&markup, None);
        debug!(page = page_index, rows = page.rows.len(), "scanned history page");
        if let Some(row) = find_row(&page, nick) {
            return Some(SearchResult {
                row: row.clone(),
                page: PageLabel::Page(page_index),
            });
        }
    }

    None
}
