use std::sync::LazyLock;

use regex::Regex;

use crate::page::SubmissionRow;
use crate::text::normalize_opt;

pub const MEMORY_LABEL: &str = "메모리";
pub const TIME_LABEL: &str = "실행시간";

static MEMORY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9,]+)\s*kb").expect("memory pattern"));
static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9,]+)\s*ms").expect("time pattern"));

/// Memory (kb) and execution time (ms) of one submission, as plain digit
/// strings without separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub mem: String,
    pub time: String,
}

/// Pull both statistics out of `row`, or nothing at all.
pub fn extract(row: &SubmissionRow) -> Option<Stats> {
    let memory = labeled_value(row, MEMORY_LABEL)?;
    let time = labeled_value(row, TIME_LABEL)?;

    let mem = unit_number(&memory, &MEMORY_PATTERN)?;
    let time = unit_number(&time, &TIME_PATTERN)?;
    Some(Stats { mem, time })
}

fn labeled_value(row: &SubmissionRow, label: &str) -> Option<String> {
    let value = normalize_opt(row.field(label));
    (!value.is_empty()).then_some(value)
}

fn unit_number(value: &str, pattern: &Regex) -> Option<String> {
    let captures = pattern.captures(value)?;
    let digits = captures.get(1)?.as_str().replace(',', "");
    if digits.is_empty() { None } else { Some(digits) }
}
