//! Line-shape detection: format type, id convention, and task line pattern.

use super::FORMAT_THRESHOLD;
use crate::schema::{FORMAT_CUSTOM, FORMAT_MARKDOWN_CHECKLIST, FORMAT_NUMBERED_LIST};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static CHECKLIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[-*+]\s*\[[ xX]\]").expect("checklist marker regex is valid")
});

static NUMBERED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+[.)]\s+").expect("numbered marker regex is valid"));

static ID_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z]{1,10})([-_]?)(\d{1,6})\b").expect("id token regex is valid")
});

/// Id pattern used when no convention can be detected.
pub const GENERIC_ID: &str = r"[A-Za-z]+[-_]?\d+";

/// Classify the sample's list style.
///
/// A style wins when its marker count exceeds `FORMAT_THRESHOLD` of all
/// sampled lines; if both do, the larger count wins (checklist on a tie).
pub fn detect_format(lines: &[&str]) -> &'static str {
    if lines.is_empty() {
        return FORMAT_CUSTOM;
    }
    let threshold = lines.len() as f64 * FORMAT_THRESHOLD;
    let checklist = lines.iter().filter(|l| CHECKLIST_MARKER.is_match(l)).count();
    let numbered = lines.iter().filter(|l| NUMBERED_MARKER.is_match(l)).count();

    let checklist_ok = checklist as f64 > threshold;
    let numbered_ok = numbered as f64 > threshold;
    match (checklist_ok, numbered_ok) {
        (true, true) if numbered > checklist => FORMAT_NUMBERED_LIST,
        (true, _) => FORMAT_MARKDOWN_CHECKLIST,
        (false, true) => FORMAT_NUMBERED_LIST,
        (false, false) => FORMAT_CUSTOM,
    }
}

/// A detected identifier convention such as `T` + 3 digits or `TASK-` + 4.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdConvention {
    pub prefix: String,
    pub separator: String,
    pub width: usize,
}

impl IdConvention {
    /// Regex source matching ids of this convention.
    pub fn pattern(&self) -> String {
        format!(
            r"{}{}\d{{{}}}",
            regex::escape(&self.prefix),
            regex::escape(&self.separator),
            self.width
        )
    }

    fn matches(&self, prefix: &str, separator: &str, digits: &str) -> bool {
        self.prefix == prefix && self.separator == separator && self.width == digits.len()
    }
}

/// Most frequent (prefix, separator, digit width) among id-shaped tokens.
/// Ties go to the convention seen first.
pub fn detect_id_convention(lines: &[&str]) -> Option<IdConvention> {
    let mut counts: HashMap<IdConvention, (usize, usize)> = HashMap::new();
    let mut order = 0;
    for line in lines {
        for caps in ID_TOKEN.captures_iter(line) {
            let convention = IdConvention {
                prefix: caps[1].to_string(),
                separator: caps[2].to_string(),
                width: caps[3].len(),
            };
            let entry = counts.entry(convention).or_insert((0, order));
            entry.0 += 1;
            order += 1;
        }
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(convention, _)| convention)
}

/// Distinct ids of `convention` in first-appearance order.
pub fn collect_ids(lines: &[&str], convention: &IdConvention) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for line in lines {
        for caps in ID_TOKEN.captures_iter(line) {
            if convention.matches(&caps[1], &caps[2], &caps[3]) {
                let id = caps[0].to_string();
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
    }
    ids
}

/// Build a task line pattern for `format_type` around an id pattern.
pub fn task_line_pattern(format_type: &str, id_pattern: &str) -> String {
    let lead = match format_type {
        FORMAT_MARKDOWN_CHECKLIST => r"^\s*[-*+]\s*\[(?P<checkbox>[ xX])\]\s*",
        FORMAT_NUMBERED_LIST => r"^\s*\d+[.)]\s*(?:\[(?P<checkbox>[ xX])\]\s*)?",
        _ => r"^\s*(?:[-*+#>]+\s*)?(?:\[(?P<checkbox>[ xX])\]\s*)?",
    };
    format!(
        r"{}(?:-\s*)?(?:\*\*)?(?P<id>{})\b\s*(?:[:.-]\s*)?(?P<description>.*?)(?:\*\*)?\s*$",
        lead, id_pattern
    )
}
