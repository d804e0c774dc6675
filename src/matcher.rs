//! Resolve free text to a task.
//!
//! Matching is best-effort. Callers that need certainty should pass an
//! explicit id through `find_by_id`; a `None` from `match_task` means
//! "consider the whole task set", never an error.

use crate::parser::{Task, tokenize};
use std::collections::HashSet;

/// Resolve a prompt to a task.
///
/// Tier 1: the first task (file order) whose id appears in the prompt,
/// case-insensitively and not glued to further letters or digits.
/// Tier 2: the task whose keywords overlap the prompt's words the most;
/// ties go to the earlier task.
pub fn match_task<'a>(prompt: &str, tasks: &'a [Task]) -> Option<&'a Task> {
    let lowered = prompt.to_lowercase();

    if let Some(task) = tasks
        .iter()
        .find(|t| contains_id(&lowered, &t.id.to_lowercase()))
    {
        return Some(task);
    }

    let words: HashSet<String> = tokenize(prompt).collect();
    let mut best: Option<(&Task, usize)> = None;
    for task in tasks {
        let score = task.keywords.iter().filter(|k| words.contains(*k)).count();
        if score == 0 {
            continue;
        }
        // Strictly greater keeps the earliest task on ties.
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((task, score));
        }
    }
    best.map(|(task, _)| task)
}

/// Exact, case-insensitive id lookup.
pub fn find_by_id<'a>(id: &str, tasks: &'a [Task]) -> Option<&'a Task> {
    let id = id.trim();
    tasks.iter().find(|t| t.id.eq_ignore_ascii_case(id))
}

pub(crate) fn contains_id(haystack: &str, id: &str) -> bool {
    if id.is_empty() {
        return false;
    }
    haystack.match_indices(id).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + id.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
