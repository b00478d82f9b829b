use crate::page::{Page, SubmissionRow};
use crate::text::normalize;

/// First row whose submitter contains `nick` (case-insensitive).
///
/// A blank `nick` selects the first row of the page, the most recent
/// submission, without looking at submitter names.
pub fn find_row<'a>(page: &'a Page, nick: &str) -> Option<&'a SubmissionRow> {
    let first = page.rows.first()?;

    let nick = normalize(nick);
    if nick.is_empty() {
        return Some(first);
    }
    let needle = nick.to_lowercase();

    page.rows.iter().find(|row| {
        let submitter = normalize(&row.submitter);
        !submitter.is_empty() && submitter.to_lowercase().contains(&needle)
    })
}
