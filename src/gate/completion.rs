//! Completion gate: a verdict must be recorded before the verifier finishes.

use super::{BlockKind, BlockReason, GateDecision, GateKind, RecordIssue, RecordProblem};
use crate::config::GateConfig;
use crate::matcher::{contains_id, find_by_id};
use crate::parser::Task;
use crate::schema::{CompiledSchema, FieldKey};
use crate::scope_record::ActiveScope;
use crate::status::{self, State};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Pass/fail outcome extracted from a verification report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

static STATUS_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:status|verdict|result)\s*[:=]\s*[*_`]*\s*(pass(?:ed)?|fail(?:ed)?)\b")
        .expect("status marker regex is valid")
});

static FAILURE_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:fail(?:s|ed|ing|ure|ures)?|errors?|broken|regressions?|crash(?:es|ed)?)\b")
        .expect("failure keyword regex is valid")
});

static NEGATED_FAILURES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:no|zero|0|without)\s+(?:errors?|failures?|failed\s+tests?|regressions?)\b")
        .expect("negated failure regex is valid")
});

/// Extract a verdict from a free-form report.
///
/// Explicit markers (`STATUS: PASS`, `Verdict: FAIL`, ...) on lines naming
/// `task_id` win, then markers anywhere. Conflicting markers read as FAIL.
/// Without markers, any failure keyword (other than "no errors" and the
/// like) reads as FAIL.
pub fn extract_verdict(report: &str, task_id: Option<&str>) -> Verdict {
    if let Some(id) = task_id {
        let id = id.to_lowercase();
        let scoped: Vec<Verdict> = report
            .lines()
            .filter(|line| contains_id(&line.to_lowercase(), &id))
            .filter_map(marker_verdict)
            .collect();
        if let Some(verdict) = combine(&scoped) {
            return verdict;
        }
    }

    let all: Vec<Verdict> = report.lines().filter_map(marker_verdict).collect();
    if let Some(verdict) = combine(&all) {
        return verdict;
    }

    let cleaned = NEGATED_FAILURES.replace_all(report, "");
    if FAILURE_WORDS.is_match(&cleaned) {
        Verdict::Fail
    } else {
        Verdict::Pass
    }
}

fn marker_verdict(line: &str) -> Option<Verdict> {
    let caps = STATUS_MARKER.captures(line)?;
    let word = caps.get(1)?.as_str().to_lowercase();
    if word.starts_with("pass") {
        Some(Verdict::Pass)
    } else {
        Some(Verdict::Fail)
    }
}

fn combine(verdicts: &[Verdict]) -> Option<Verdict> {
    if verdicts.is_empty() {
        None
    } else if verdicts.contains(&Verdict::Fail) {
        Some(Verdict::Fail)
    } else {
        Some(Verdict::Pass)
    }
}

/// Check that every task in the active scope records the report's verdict.
///
/// For each scoped task the verification field must hold the canonical value
/// for the verdict (any failure-shaped value for FAIL) and its checkbox must
/// be checked. A correctly recorded FAIL still blocks, routing the work back
/// to the implementing role.
pub fn check_completion(
    report: &str,
    scope: &ActiveScope,
    tasks: &[Task],
    schema: &CompiledSchema,
    gates: &GateConfig,
) -> GateDecision {
    let field = &gates.verification_field;
    let mut problems = Vec::new();

    for id in &scope.task_ids {
        let Some(task) = find_by_id(id, tasks) else {
            problems.push(RecordProblem {
                task_id: id.clone(),
                field: field.clone(),
                line: None,
                issue: RecordIssue::UnknownTask,
            });
            continue;
        };
        let verdict = extract_verdict(report, Some(&task.id));
        if let Some(issue) = inspect_record(task, field, verdict, schema) {
            problems.push(RecordProblem {
                task_id: task.id.clone(),
                field: field.clone(),
                line: task.field(field).and_then(|f| f.line),
                issue,
            });
        }
    }

    if problems.is_empty() {
        return GateDecision::Allow;
    }

    let mut task_ids: Vec<String> = Vec::new();
    for problem in &problems {
        if !task_ids.contains(&problem.task_id) {
            task_ids.push(problem.task_id.clone());
        }
    }
    let directive = problems
        .iter()
        .map(|p| describe(p, gates))
        .collect::<Vec<_>>()
        .join("\n");

    GateDecision::Block(BlockReason {
        gate: GateKind::Completion,
        task_ids,
        kind: BlockKind::Completion { problems },
        directive,
    })
}

fn inspect_record(
    task: &Task,
    field: &FieldKey,
    verdict: Verdict,
    schema: &CompiledSchema,
) -> Option<RecordIssue> {
    let record = task.field(field);
    let raw = record.and_then(|f| f.raw.as_deref());
    let checked = record.is_some_and(|f| f.checked);
    let state = task.state(field);

    let contradicts = match verdict {
        Verdict::Pass => state == State::VerifiedFailure,
        Verdict::Fail => state == State::VerifiedSuccess,
    };
    if contradicts {
        return Some(RecordIssue::ContradictsVerdict {
            verdict,
            recorded: raw.unwrap_or_default().to_string(),
        });
    }

    let expected = expected_value(field, verdict, schema);
    let value_ok = match verdict {
        Verdict::Pass => raw.is_some_and(|r| r.trim().eq_ignore_ascii_case(&expected)),
        Verdict::Fail => state == State::VerifiedFailure,
    };

    match (value_ok, checked) {
        (false, false) => Some(RecordIssue::NeitherUpdated { expected }),
        (false, true) => Some(RecordIssue::CheckboxOnly { expected }),
        (true, false) => Some(RecordIssue::ValueOnly),
        (true, true) => match verdict {
            Verdict::Pass => None,
            Verdict::Fail => Some(RecordIssue::RecordedFailure {
                reason: record.and_then(|f| f.reason.clone()),
            }),
        },
    }
}

/// The value the record should hold for `verdict`.
fn expected_value(field: &FieldKey, verdict: Verdict, schema: &CompiledSchema) -> String {
    let state = match verdict {
        Verdict::Pass => State::VerifiedSuccess,
        Verdict::Fail => State::VerifiedFailure,
    };
    let canonical = status::canonical(field, state, schema)
        .unwrap_or(state.as_str())
        .to_string();
    let has_failure_expression = schema.field(field).is_some_and(|f| f.failure.is_some());
    if verdict == Verdict::Fail && has_failure_expression {
        format!("{} - <reason>", canonical)
    } else {
        canonical
    }
}

fn describe(problem: &RecordProblem, gates: &GateConfig) -> String {
    let id = &problem.task_id;
    let location = match problem.line {
        Some(line) => format!("{} {} status (line {})", id, problem.field, line),
        None => format!("{} {} status (no status line yet)", id, problem.field),
    };
    match &problem.issue {
        RecordIssue::NeitherUpdated { expected } => format!(
            "{}: value not updated and checkbox not checked. Set the value to [{}] and check the box ([x]).",
            location, expected
        ),
        RecordIssue::CheckboxOnly { expected } => format!(
            "{}: checkbox is checked but the value was not updated. Set the value to [{}].",
            location, expected
        ),
        RecordIssue::ValueOnly => format!(
            "{}: value is recorded but the checkbox is not checked. Change [ ] to [x].",
            location
        ),
        RecordIssue::ContradictsVerdict { verdict, recorded } => format!(
            "{}: the report says {} but the checklist records [{}]. Record the actual verdict.",
            location, verdict, recorded
        ),
        RecordIssue::RecordedFailure { reason } => format!(
            "{}: verification FAILED{} and is recorded. Do not apply the fix in this step; \
             re-invoke the {} role to rework {} (reset it with `taskgate rework {}`).",
            location,
            reason
                .as_deref()
                .map(|r| format!(" ({})", r))
                .unwrap_or_default(),
            gates.implementer_role,
            id,
            id
        ),
        RecordIssue::UnknownTask => format!(
            "{} is in the active scope but not in the checklist. Fix the scope with `taskgate scope remove {}`.",
            id, id
        ),
    }
}
