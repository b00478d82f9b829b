use std::sync::LazyLock;

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::text::{normalize, parse_int_prefix};

macro_rules! selector {
    ($css:literal) => {{
        static SELECTOR: LazyLock<Selector> =
            LazyLock::new(|| Selector::parse($css).expect(concat!("valid selector: ", $css)));
        &*SELECTOR
    }};
}

/// One judge submission record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionRow {
    pub submitter: String,
    pub fields: Vec<(String, String)>,
}

impl SubmissionRow {
    /// Value of the first informational field whose label equals `label`.
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(candidate, _)| candidate == label)
            .map(|(_, value)| value.as_str())
    }
}

/// The history page's query form (`form#problemForm`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryForm {
    pub action: Option<String>,
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub rows: Vec<SubmissionRow>,
    pub declared_end_page: Option<i64>,
    pub page_links: Vec<i64>,
    pub form: Option<QueryForm>,
    pub base_url: Option<Url>,
}

impl Page {
    /// Parse a submission-history document. Rows keep document order.
    pub fn parse(markup: &str, base_url: Option<Url>) -> Self {
        let document = Html::parse_document(markup);

        let rows = document
            .select(selector!(".problem_smt"))
            .map(parse_row)
            .collect();
        let declared_end_page = document
            .select(selector!("#endPage"))
            .next()
            .and_then(|element| parse_int_prefix(&element_text(element)));
        let page_links = document
            .select(selector!(".pagination .page-link"))
            .filter_map(|element| parse_int_prefix(&element_text(element)))
            .collect();
        let form = document
            .select(selector!("form#problemForm"))
            .next()
            .map(parse_form);

        Self {
            rows,
            declared_end_page,
            page_links,
            form,
            base_url,
        }
    }

    /// Highest page index of the history: the declared end page when it is
    /// positive, otherwise the largest visible page link, otherwise 1.
    pub fn end_page(&self) -> u32 {
        if let Some(declared) = self.declared_end_page
            && declared > 0
        {
            return clamp_page(declared);
        }
        self.page_links
            .iter()
            .copied()
            .max()
            .map(clamp_page)
            .unwrap_or(1)
    }

    /// Where the query form posts to. A form without an action posts back to
    /// the page itself; without a form (or a usable base) `fallback` is used.
    pub fn submit_url(&self, fallback: &str) -> String {
        let Some(form) = &self.form else {
            return fallback.to_string();
        };
        let action = form
            .action
            .as_deref()
            .map(str::trim)
            .filter(|action| !action.is_empty());
        let resolved = match (action, &self.base_url) {
            (Some(action), Some(base)) => base.join(action).ok(),
            (Some(action), None) => Url::parse(action).ok(),
            (None, Some(base)) => Some(base.clone()),
            (None, None) => None,
        };
        resolved
            .map(|url| url.to_string())
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn form_fields(&self) -> &[(String, String)] {
        self.form
            .as_ref()
            .map(|form| form.fields.as_slice())
            .unwrap_or(&[])
    }
}

fn clamp_page(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

fn parse_row(row: ElementRef<'_>) -> SubmissionRow {
    let submitter = row
        .select(selector!(".submitter .club_name .name"))
        .next()
        .map(element_text)
        .unwrap_or_default();

    let mut fields = Vec::new();
    for item in row.select(selector!(".info li")) {
        let spans = item.select(selector!("span")).collect::<Vec<_>>();
        if spans.len() < 2 {
            continue;
        }
        let value = element_text(spans[0]);
        let label = element_text(spans[1]);
        fields.push((label, value));
    }

    SubmissionRow { submitter, fields }
}

fn parse_form(form: ElementRef<'_>) -> QueryForm {
    let action = form.value().attr("action").map(ToString::to_string);
    let mut fields = Vec::new();

    for control in form.select(selector!("input[name], select[name], textarea[name]")) {
        let element = control.value();
        if element.attr("disabled").is_some() {
            continue;
        }
        let Some(name) = element.attr("name").filter(|name| !name.is_empty()) else {
            continue;
        };

        match element.name() {
            "input" => {
                let kind = element.attr("type").unwrap_or("text").to_ascii_lowercase();
                match kind.as_str() {
                    "submit" | "button" | "reset" | "image" | "file" => {}
                    "checkbox" | "radio" => {
                        if element.attr("checked").is_some() {
                            let value = element.attr("value").unwrap_or("on");
                            fields.push((name.to_string(), value.to_string()));
                        }
                    }
                    _ => {
                        let value = element.attr("value").unwrap_or("");
                        fields.push((name.to_string(), value.to_string()));
                    }
                }
            }
            "select" => {
                let options = control.select(selector!("option")).collect::<Vec<_>>();
                let selected = options
                    .iter()
                    .filter(|option| option.value().attr("selected").is_some())
                    .collect::<Vec<_>>();
                let chosen = if !selected.is_empty() {
                    selected
                } else if element.attr("multiple").is_none() {
                    options.iter().take(1).collect()
                } else {
                    Vec::new()
                };
                for option in chosen {
                    let value = option
                        .value()
                        .attr("value")
                        .map(ToString::to_string)
                        .unwrap_or_else(|| element_text(*option));
                    fields.push((name.to_string(), value));
                }
            }
            "textarea" => {
                fields.push((name.to_string(), control.text().collect::<String>()));
            }
            _ => {}
        }
    }

    QueryForm { action, fields }
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize(&element.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use reqwest::Url;

    use super::Page;
    use crate::test_support::{history_page, submission_row};

    #[test]
    fn parse_reads_rows_in_document_order() {
        let markup = history_page(
            &[
                submission_row("Alice123", "12,345 kb", "678 ms"),
                submission_row("bob", "1,024 kb", "99 ms"),
            ],
            None,
        );
        let page = Page::parse(&markup, None);

        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[0].submitter, "Alice123");
        assert_eq!(page.rows[0].field("메모리"), Some("12,345 kb"));
        assert_eq!(page.rows[0].field("실행시간"), Some("678 ms"));
        assert_eq!(page.rows[1].submitter, "bob");
    }

    #[test]
    fn parse_skips_info_items_without_two_spans() {
        let markup = r#"
            <div class="problem_smt">
              <div class="submitter"><span class="club_name"><span class="name"> carol </span></span></div>
              <ul class="info">
                <li><span>Java</span></li>
                <li><span> 2,048 kb </span><span> 메모리 </span></li>
              </ul>
            </div>"#;
        let page = Page::parse(markup, None);

        assert_eq!(page.rows[0].submitter, "carol");
        assert_eq!(page.rows[0].fields.len(), 1);
        assert_eq!(page.rows[0].field("메모리"), Some("2,048 kb"));
    }

    #[test]
    fn missing_submitter_is_empty() {
        let markup = r#"<div class="problem_smt"><ul class="info"></ul></div>"#;
        let page = Page::parse(markup, None);
        assert_eq!(page.rows[0].submitter, "");
        assert!(page.rows[0].fields.is_empty());
    }

    #[test]
    fn end_page_prefers_declared_value() {
        let markup = r#"
            <span id="endPage"> 7 </span>
            <ul class="pagination"><li><a class="page-link">1</a></li><li><a class="page-link">2</a></li></ul>"#;
        assert_eq!(Page::parse(markup, None).end_page(), 7);
    }

    #[test]
    fn end_page_falls_back_to_largest_link() {
        let markup = r#"
            <span id="endPage">0</span>
            <ul class="pagination">
              <li><a class="page-link">&laquo;</a></li>
              <li><a class="page-link">3</a></li>
              <li><a class="page-link">5</a></li>
              <li><a class="page-link">4</a></li>
            </ul>"#;
        assert_eq!(Page::parse(markup, None).end_page(), 5);
    }

    #[test]
    fn end_page_defaults_to_one() {
        assert_eq!(Page::parse("<html><body></body></html>", None).end_page(), 1);
    }

    #[test]
    fn form_fields_follow_successful_control_rules() {
        let markup = r#"
            <form id="problemForm" action="/main/talk/solvingClub/problemSubmitHistory.do" method="post">
              <input type="hidden" name="contestProbId" value="AV5PpFQaAQMDFAUq">
              <input type="text" name="nickName">
              <input type="checkbox" name="onlyPass" value="Y">
              <input type="checkbox" name="ownOnly" checked>
              <input type="radio" name="order" value="asc">
              <input type="radio" name="order" value="desc" checked>
              <input type="submit" name="go" value="Search">
              <input type="text" name="ignored" value="x" disabled>
              <select name="language">
                <option value="ALL">All</option>
                <option value="JAVA">Java</option>
              </select>
              <select name="pageSize">
                <option>10</option>
                <option selected>30</option>
              </select>
              <textarea name="memo">hi</textarea>
            </form>"#;
        let page = Page::parse(markup, None);
        let fields = page.form_fields();

        assert_eq!(
            fields,
            &[
                ("contestProbId".to_string(), "AV5PpFQaAQMDFAUq".to_string()),
                ("nickName".to_string(), String::new()),
                ("ownOnly".to_string(), "on".to_string()),
                ("order".to_string(), "desc".to_string()),
                ("language".to_string(), "ALL".to_string()),
                ("pageSize".to_string(), "30".to_string()),
                ("memo".to_string(), "hi".to_string()),
            ]
        );
    }

    #[test]
    fn submit_url_resolves_form_action_against_base() {
        let markup = r#"<form id="problemForm" action="/main/history.do"></form>"#;
        let base = Url::parse("https://swexpertacademy.com/main/talk/index.do").expect("url");
        let page = Page::parse(markup, Some(base));
        assert_eq!(
            page.submit_url("https://fallback.example/"),
            "https://swexpertacademy.com/main/history.do"
        );
    }

    #[test]
    fn submit_url_without_action_posts_to_base() {
        let markup = r#"<form id="problemForm"></form>"#;
        let base = Url::parse("https://swexpertacademy.com/main/page.do?x=1").expect("url");
        let page = Page::parse(markup, Some(base));
        assert_eq!(
            page.submit_url("https://fallback.example/"),
            "https://swexpertacademy.com/main/page.do?x=1"
        );
    }

    #[test]
    fn submit_url_uses_fallback_without_form_or_base() {
        let page = Page::parse("<div></div>", None);
        assert_eq!(page.submit_url("https://fallback.example/"), "https://fallback.example/");

        let relative = Page::parse(r#"<form id="problemForm" action="/x.do"></form>"#, None);
        assert_eq!(
            relative.submit_url("https://fallback.example/"),
            "https://fallback.example/"
        );
    }
}
