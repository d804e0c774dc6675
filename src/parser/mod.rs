//! Checklist task parser.
//!
//! Turns checklist text into ordered `Task` records in one forward scan:
//!
//! - a task line starts a new task (flushing the previous one)
//! - a status line updates one field of the current task
//! - anything else (prose, blank lines, untracked sub-bullets) is skipped
//!
//! ```text
//! - [ ] - **T001: Add login route**
//!   - [ ] - Dev Status: [In Progress]
//!   - [ ] - QA Status: [Not Started]
//! ```
//!
//! Tasks are recreated on every parse; the file is the only source of truth.

mod keywords;


pub use keywords::{MAX_KEYWORDS, extract_keywords, tokenize};

use crate::schema::{CompiledSchema, FieldKey};
use crate::status::{self, State};
use regex::Captures;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Recorded status of one field on one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldStatus {
    /// Raw value text between the brackets, if a status line was found.
    pub raw: Option<String>,
    /// Whether the status line's checkbox is marked.
    pub checked: bool,
    /// 1-based line number of the status line.
    pub line: Option<usize>,
    pub state: State,
    /// Failure reason captured from the failure expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl FieldStatus {
    fn absent(state: State) -> Self {
        Self {
            raw: None,
            checked: false,
            line: None,
            state,
            reason: None,
        }
    }
}

/// One unit of work parsed from the checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: String,
    pub description: String,
    /// 1-based line number of the task line.
    pub line: usize,
    /// Whether the task line's own checkbox is marked.
    pub checkbox: bool,
    pub fields: BTreeMap<FieldKey, FieldStatus>,
    pub keywords: Vec<String>,
}

impl Task {
    pub fn field(&self, key: &FieldKey) -> Option<&FieldStatus> {
        self.fields.get(key)
    }

    /// State of a field; untracked fields read as their weakest state.
    pub fn state(&self, key: &FieldKey) -> State {
        self.fields
            .get(key)
            .map(|f| f.state)
            .unwrap_or_else(|| key.default_kind().weakest())
    }
}

/// Parse checklist text into tasks, in file order.
///
/// Pure: the same text and schema always produce the same tasks.
pub fn parse(text: &str, schema: &CompiledSchema) -> Vec<Task> {
    let mut tasks: Vec<Task> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut current: Option<Task> = None;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;

        if let Some(caps) = schema.task_line.regex.captures(line) {
            if let Some(task) = current.take() {
                tasks.push(task);
            }
            let groups = &schema.task_line.groups;
            let Some(id) = capture(&caps, &groups.id).filter(|id| !id.is_empty()) else {
                continue;
            };
            if !seen.insert(id.clone()) {
                tracing::warn!(task = %id, line = line_no, "duplicate task id; keeping the first occurrence");
                continue;
            }
            let description = capture(&caps, &groups.description).unwrap_or_default();
            current = Some(Task {
                keywords: extract_keywords(&description),
                id,
                description,
                line: line_no,
                checkbox: is_checked(&caps, &groups.checkbox),
                fields: empty_fields(schema),
            });
            continue;
        }

        let Some(task) = current.as_mut() else {
            continue;
        };
        let Some(caps) = schema.status_line.regex.captures(line) else {
            continue;
        };
        let groups = &schema.status_line.groups;
        let Some(label) = capture(&caps, &groups.label) else {
            continue;
        };
        let Some(key) = schema.resolve_label(&label) else {
            tracing::debug!(task = %task.id, label = %label, "skipping untracked status label");
            continue;
        };
        let field = task
            .fields
            .entry(key.clone())
            .or_insert_with(|| FieldStatus::absent(key.default_kind().weakest()));
        field.raw = Some(capture(&caps, &groups.value).unwrap_or_default());
        field.checked = is_checked(&caps, &groups.checkbox);
        field.line = Some(line_no);
    }

    if let Some(task) = current.take() {
        tasks.push(task);
    }

    for task in &mut tasks {
        for (key, field) in task.fields.iter_mut() {
            if let Some(raw) = &field.raw {
                let normalized = status::normalize(raw, key, schema);
                field.state = normalized.state;
                field.reason = normalized.reason;
            }
        }
    }

    tasks
}

fn empty_fields(schema: &CompiledSchema) -> BTreeMap<FieldKey, FieldStatus> {
    schema
        .field_keys()
        .map(|key| {
            (
                key.clone(),
                FieldStatus::absent(schema.field_kind(key).weakest()),
            )
        })
        .collect()
}

fn capture(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name).map(|m| m.as_str().trim().to_string())
}

fn is_checked(caps: &Captures<'_>, name: &str) -> bool {
    caps.name(name)
        .map(|m| m.as_str().trim().eq_ignore_ascii_case("x"))
        .unwrap_or(false)
}
