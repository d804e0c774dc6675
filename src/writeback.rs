//! Checklist write-back.
//!
//! Status updates are surgical: only the value span and (optionally) the
//! checkbox span of one existing status line are rewritten, located through
//! the same compiled status pattern the parser used. Every other byte of the
//! file, line endings included, is preserved.

use crate::config::GateConfig;
use crate::error::{Result, TaskgateError};
use crate::parser::Task;
use crate::schema::{CompiledLine, CompiledSchema, FieldKey, literal_prefix};
use crate::status::{self, State};
use std::ops::Range;

/// Replace the value (and optionally the checkbox) of `task`'s `field`
/// status line, returning the new file text.
///
/// `checked: None` leaves the checkbox untouched.
pub fn set_field(
    text: &str,
    task: &Task,
    field: &FieldKey,
    value: &str,
    checked: Option<bool>,
    schema: &CompiledSchema,
) -> Result<String> {
    if value.contains(']') || value.contains('\n') {
        return Err(TaskgateError::UserError(format!(
            "status value '{}' may not contain ']' or a line break",
            value
        )));
    }

    let line_no = task.field(field).and_then(|f| f.line).ok_or_else(|| {
        TaskgateError::UserError(format!(
            "{} has no {} status line to update; add one under line {} first",
            task.id, field, task.line
        ))
    })?;

    let mut out = String::with_capacity(text.len() + value.len());
    let mut found = false;
    for (index, line) in text.split_inclusive('\n').enumerate() {
        if index + 1 != line_no {
            out.push_str(line);
            continue;
        }
        let (body, ending) = split_ending(line);
        let rewritten = rewrite_line(body, &schema.status_line, value, checked).ok_or_else(|| {
            TaskgateError::UserError(format!(
                "line {} no longer looks like the {} status line of {}; re-run `taskgate status`",
                line_no, field, task.id
            ))
        })?;
        out.push_str(&rewritten);
        out.push_str(ending);
        found = true;
    }

    if !found {
        return Err(TaskgateError::UserError(format!(
            "line {} is past the end of the checklist",
            line_no
        )));
    }
    Ok(out)
}

/// Record `state` for `field` using the field's canonical raw form.
///
/// A failure with a reason is written in the shape the field's failure
/// expression recognizes (`Failed - <reason>` for the default schema). The
/// written value is checked to normalize back to `state`.
pub fn record_state(
    text: &str,
    task: &Task,
    field: &FieldKey,
    state: State,
    reason: Option<&str>,
    checked: Option<bool>,
    schema: &CompiledSchema,
) -> Result<String> {
    let kind = schema.field_kind(field);
    if state.kind() != kind {
        return Err(TaskgateError::UserError(format!(
            "state '{}' is not valid for the {} field '{}'",
            state, kind, field
        )));
    }

    let canonical = status::canonical(field, state, schema).ok_or_else(|| {
        TaskgateError::UserError(format!(
            "the schema lists no value for '{}' on field '{}'",
            state, field
        ))
    })?;

    let value = match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) if state == State::VerifiedFailure => failure_value(field, canonical, reason, schema)?,
        Some(_) => {
            return Err(TaskgateError::UserError(
                "a reason can only be recorded with verified_failure".to_string(),
            ));
        }
        None => canonical.to_string(),
    };

    let normalized = status::normalize(&value, field, schema);
    if normalized.state != state {
        return Err(TaskgateError::UserError(format!(
            "value '{}' would read back as '{}', not '{}'",
            value, normalized.state, state
        )));
    }

    set_field(text, task, field, &value, checked, schema)
}

/// Reset a task whose verification failed so it can be reworked.
///
/// Verification goes back to its not-verified form (unchecked) and dev goes
/// to in progress (unchecked). Any other starting state is refused.
pub fn reset_for_rework(
    text: &str,
    task: &Task,
    gates: &GateConfig,
    schema: &CompiledSchema,
) -> Result<String> {
    let verification = task.state(&gates.verification_field);
    if verification != State::VerifiedFailure {
        return Err(TaskgateError::UserError(format!(
            "{} cannot be reworked: its {} field is '{}', not verified_failure",
            task.id, gates.verification_field, verification
        )));
    }

    let text = record_state(
        text,
        task,
        &gates.verification_field,
        State::NotVerified,
        None,
        Some(false),
        schema,
    )?;
    record_state(
        &text,
        task,
        &gates.dev_field,
        State::InProgress,
        None,
        Some(false),
        schema,
    )
}

fn failure_value(
    field: &FieldKey,
    canonical: &str,
    reason: &str,
    schema: &CompiledSchema,
) -> Result<String> {
    let mut candidates = vec![format!("{} - {}", canonical, reason)];
    if let Some(failure) = schema.field(field).and_then(|f| f.failure.as_ref()) {
        let prefix = literal_prefix(failure.regex.as_str());
        if !prefix.trim().is_empty() {
            candidates.push(format!("{}{}", prefix, reason));
        }
    }

    candidates
        .into_iter()
        .find(|candidate| {
            status::normalize(candidate, field, schema).state == State::VerifiedFailure
        })
        .ok_or_else(|| {
            TaskgateError::UserError(format!(
                "cannot write a failure reason for '{}': no value shape matches its failure expression",
                field
            ))
        })
}

fn rewrite_line(
    line: &str,
    status_line: &CompiledLine,
    value: &str,
    checked: Option<bool>,
) -> Option<String> {
    let caps = status_line.regex.captures(line)?;
    let mut edits: Vec<(Range<usize>, &str)> =
        vec![(caps.name(&status_line.groups.value)?.range(), value)];
    if let Some(checked) = checked
        && let Some(checkbox) = caps.name(&status_line.groups.checkbox)
    {
        edits.push((checkbox.range(), if checked { "x" } else { " " }));
    }

    // Back to front so earlier spans stay valid.
    edits.sort_by_key(|(range, _)| std::cmp::Reverse(range.start));
    let mut out = line.to_string();
    for (range, replacement) in edits {
        out.replace_range(range, replacement);
    }
    Some(out)
}

fn split_ending(line: &str) -> (&str, &str) {
    let body = line.trim_end_matches(['\n', '\r']);
    (body, &line[body.len()..])
}
