use thiserror::Error;
use tracing::debug;

use crate::clipboard::ClipboardWriter;
use crate::extract::{Stats, extract};
use crate::format::format_output;
use crate::page::Page;
use crate::search::{PageFetcher, PageLabel, search_all_pages};

/// Failures that end a copy run and are shown to the user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CopyError {
    #[error("no submission by '{nick}' on the current page or any history page")]
    NotFound { nick: String },
    #[error("could not read memory/execution time from the matched submission")]
    Extraction,
    #[error("clipboard write failed")]
    Clipboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyReport {
    pub page: PageLabel,
    pub submitter: String,
    pub stats: Stats,
    pub text: String,
}

/// Search, extract, format and copy the statistics for `nick`.
pub fn run_copy(
    nick: &str,
    current: &Page,
    fetcher: &dyn PageFetcher,
    clipboard: &mut ClipboardWriter,
) -> Result<CopyReport, CopyError> {
    let result = search_all_pages(current, nick, fetcher).ok_or_else(|| CopyError::NotFound {
        nick: nick.to_string(),
    })?;
    let stats = extract(&result.row).ok_or(CopyError::Extraction)?;
    let text = format_output(&stats);

    if !clipboard.write(&text) {
        return Err(CopyError::Clipboard);
    }
    debug!(
        page = %result.page,
        submitter = %result.row.submitter,
        "clipboard holds the formatted stats"
    );

    Ok(CopyReport {
        page: result.page,
        submitter: result.row.submitter,
        stats,
        text,
    })
}
