//! Status field discovery: labels, semantic keys, and value vocabularies.

use crate::schema::{FieldKey, FieldSemantics};
use crate::status::{FieldKind, State};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Status line pattern written into inferred schemas.
pub const INFERRED_STATUS_LINE: &str = r"^\s*(?:[-*+]|\d+[.)])?\s*(?:\[(?P<checkbox>[ xX])\]\s*)?(?:-\s*)?(?P<label>[A-Za-z][A-Za-z0-9 /_&-]*?)\s*:\s*\[(?P<value>[^\]]*)\]\s*$";

static LABEL_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(INFERRED_STATUS_LINE).expect("status line regex is valid"));

static FAILURE_WITH_REASON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+)\s*[-:]\s+\S").expect("failure reason regex is valid")
});

// Vocabularies match whole words, case-insensitively.
static PROGRESS_NOT_STARTED: LazyLock<Regex> = LazyLock::new(|| {
    vocabulary(
        r"not\s+started|not\s+begun|incomplete|not\s+complete[d]?|not\s+done|todo|to\s+do|pending|open|none|backlog|blocked",
    )
});
static PROGRESS_IN_PROGRESS: LazyLock<Regex> = LazyLock::new(|| {
    vocabulary(r"in\s+progress|progress|doing|wip|started|working|active|ongoing|in\s+review|review(?:ing)?")
});
static PROGRESS_COMPLETE: LazyLock<Regex> = LazyLock::new(|| {
    vocabulary(r"complete[d]?|done|finished|closed|merged|implemented|resolved")
});

static VERIFY_NOT_VERIFIED: LazyLock<Regex> = LazyLock::new(|| {
    vocabulary(
        r"not\s+started|not\s+verified|not\s+tested|not\s+ok|not\s+pass(?:ed|ing)?|not\s+approved|not\s+accepted|unverified|untested|pending|todo|to\s+do|none|waiting|in\s+progress",
    )
});
static VERIFY_FAILURE: LazyLock<Regex> = LazyLock::new(|| {
    vocabulary(r"fail(?:s|ed|ing|ures?)?|reject(?:s|ed|ion)?|errors?|broken")
});
static VERIFY_SUCCESS: LazyLock<Regex> = LazyLock::new(|| {
    vocabulary(r"pass(?:es|ed|ing)?|verified|success(?:ful)?|approved|accepted|complete[d]?|done|ok(?:ay)?")
});

fn vocabulary(alternatives: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives)).expect("vocabulary regex is valid")
}

/// Raw status observations grouped by the raw label text.
#[derive(Debug, Default)]
pub struct LabelObservations {
    /// Raw label -> distinct raw values, both in first-appearance order.
    pub by_label: Vec<(String, Vec<String>)>,
}

impl LabelObservations {
    fn record(&mut self, label: &str, value: &str) {
        let index = match self.by_label.iter().position(|(l, _)| l == label) {
            Some(index) => index,
            None => {
                self.by_label.push((label.to_string(), Vec::new()));
                self.by_label.len() - 1
            }
        };
        let values = &mut self.by_label[index].1;
        if !values.iter().any(|v| v.eq_ignore_ascii_case(value)) {
            values.push(value.to_string());
        }
    }
}

/// Collect every `label: [value]` line.
pub fn collect_labels(lines: &[&str]) -> LabelObservations {
    let mut observations = LabelObservations::default();
    for line in lines {
        if let Some(caps) = LABEL_VALUE.captures(line) {
            let label = caps["label"].trim();
            let value = caps["value"].trim();
            if !label.is_empty() && !value.is_empty() {
                observations.record(label, value);
            }
        }
    }
    observations
}

/// Map a raw label to a semantic key by keyword.
pub fn semantic_key(label: &str) -> FieldKey {
    let lowered = label.to_lowercase();
    if lowered.contains("dev") {
        FieldKey::Dev
    } else if lowered.contains("qa") || lowered.contains("quality") {
        FieldKey::Qa
    } else if lowered.contains("user") || lowered.contains("verification") {
        FieldKey::UserVerification
    } else {
        FieldKey::from(slugify(label))
    }
}

fn slugify(label: &str) -> String {
    let mut slug = String::new();
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_').to_string();
    if slug.is_empty() { "field".to_string() } else { slug }
}

/// Build `field_mapping` and `status_semantics` from observations.
pub fn build_fields(
    observations: &LabelObservations,
) -> (
    BTreeMap<FieldKey, Vec<String>>,
    BTreeMap<FieldKey, FieldSemantics>,
) {
    let mut mapping: BTreeMap<FieldKey, Vec<String>> = BTreeMap::new();
    let mut values: BTreeMap<FieldKey, Vec<String>> = BTreeMap::new();

    for (label, observed) in &observations.by_label {
        let key = semantic_key(label);
        let labels = mapping.entry(key.clone()).or_default();
        if !labels.iter().any(|l| l.eq_ignore_ascii_case(label)) {
            labels.push(label.clone());
        }
        let field_values = values.entry(key).or_default();
        for value in observed {
            if !field_values.iter().any(|v| v.eq_ignore_ascii_case(value)) {
                field_values.push(value.clone());
            }
        }
    }

    let semantics = values
        .into_iter()
        .map(|(key, observed)| {
            let kind = key.default_kind();
            let field = build_semantics(kind, &observed);
            (key, field)
        })
        .collect();

    (mapping, semantics)
}

fn build_semantics(kind: FieldKind, observed: &[String]) -> FieldSemantics {
    let mut states: BTreeMap<State, Vec<String>> = BTreeMap::new();
    let mut failure_words: Vec<String> = Vec::new();

    for value in observed {
        let state = classify(value, kind).unwrap_or_else(|| kind.weakest());
        if state == State::VerifiedFailure
            && let Some(caps) = FAILURE_WITH_REASON.captures(value)
        {
            let word = caps[1].to_string();
            if !failure_words.iter().any(|w| w.eq_ignore_ascii_case(&word)) {
                failure_words.push(word.clone());
            }
            push_variant(&mut states, state, &word);
            continue;
        }
        push_variant(&mut states, state, value);
    }

    for state in kind.states() {
        if states.get(state).is_some_and(|v| !v.is_empty()) {
            continue;
        }
        let taken = |candidate: &str| {
            states
                .values()
                .flatten()
                .any(|v| v.eq_ignore_ascii_case(candidate))
        };
        if let Some(fallback) = fallback_variants(*state).iter().copied().find(|c| !taken(*c)) {
            push_variant(&mut states, *state, fallback);
        }
    }

    let failure_pattern = if failure_words.is_empty() {
        None
    } else {
        let words: Vec<String> = failure_words.iter().map(|w| regex::escape(w)).collect();
        Some(format!(r"^(?:{})\s*[-:]\s*(?P<reason>.+)$", words.join("|")))
    };

    FieldSemantics {
        kind: Some(kind),
        states,
        failure_pattern,
    }
}

fn push_variant(states: &mut BTreeMap<State, Vec<String>>, state: State, value: &str) {
    let already = states
        .values()
        .flatten()
        .any(|v| v.eq_ignore_ascii_case(value));
    if !already {
        states.entry(state).or_default().push(value.to_string());
    }
}

/// Classify a raw value by keyword; `None` when nothing matches.
///
/// Negative vocabulary is checked first so that "not verified" never reads
/// as verified and "incomplete" never reads as complete.
pub fn classify(value: &str, kind: FieldKind) -> Option<State> {
    let has = |words: &Regex| words.is_match(value);
    match kind {
        FieldKind::Progress => {
            if has(&PROGRESS_NOT_STARTED) {
                Some(State::NotStarted)
            } else if has(&PROGRESS_IN_PROGRESS) {
                Some(State::InProgress)
            } else if has(&PROGRESS_COMPLETE) {
                Some(State::Complete)
            } else {
                None
            }
        }
        FieldKind::Verification => {
            if has(&VERIFY_NOT_VERIFIED) {
                Some(State::NotVerified)
            } else if has(&VERIFY_FAILURE) {
                Some(State::VerifiedFailure)
            } else if has(&VERIFY_SUCCESS) {
                Some(State::VerifiedSuccess)
            } else {
                None
            }
        }
    }
}

fn fallback_variants(state: State) -> &'static [&'static str] {
    match state {
        State::NotStarted => &["Not Started", "Pending"],
        State::InProgress => &["In Progress", "Started"],
        State::Complete => &["Complete", "Done"],
        State::NotVerified => &["Not Verified", "Not Started", "Pending"],
        State::VerifiedSuccess => &["Passed", "Verified"],
        State::VerifiedFailure => &["Failed", "Rejected"],
    }
}
