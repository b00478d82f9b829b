use crate::extract::Stats;
use crate::text::format_thousands;

/// Render the doc comment pasted above a solution.
pub fn format_output(stats: &Stats) -> String {
    format!(
        "/**\n* 메모리 사용량 : {} kb\n* 실행 시간: {} ms\n*/",
        format_thousands(&stats.mem),
        format_thousands(&stats.time)
    )
}
