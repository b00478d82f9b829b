//! Markup builders shaped like the SWEA submission-history page.

pub fn submission_row(submitter: &str, memory: &str, time: &str) -> String {
    format!(
        r#"<div class="problem_smt">
  <div class="submitter"><span class="club_name"><span class="name">{submitter}</span></span></div>
  <ul class="info">
    <li><span>Java</span><span>언어</span></li>
    <li><span>{memory}</span><span>메모리</span></li>
    <li><span>{time}</span><span>실행시간</span></li>
    <li><span>1,234</span><span>코드길이</span></li>
  </ul>
</div>"#
    )
}

pub fn history_page(rows: &[String], end_page: Option<u32>) -> String {
    let end_page = end_page
        .map(|value| format!(r#"<span id="endPage">{value}</span>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body>
<form id="problemForm" action="/main/talk/solvingClub/problemSubmitHistory.do" method="post">
  <input type="hidden" name="contestProbId" value="AV5PpFQaAQMDFAUq">
  <input type="hidden" name="pageIndex" value="1">
</form>
<div class="history">{rows}</div>
{end_page}
</body></html>"#,
        rows = rows.join("\n")
    )
}
