//! Pre-work gate: single task in flight, verify before next.

use super::{BlockKind, BlockReason, GateDecision, GateKind};
use crate::config::GateConfig;
use crate::matcher::{find_by_id, match_task};
use crate::parser::Task;
use crate::status::State;

/// How the caller identifies the task it is about to work on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// An explicit id; resolved exactly, never fuzzily.
    Id(&'a str),
    /// Free text resolved through the matcher.
    Prompt(&'a str),
    /// Nothing to resolve; whole-set policy applies.
    Unspecified,
}

/// Resolve `target` and apply the pre-work gate.
///
/// An explicit id that does not exist blocks; an unmatched prompt falls
/// back to the whole-set policy.
pub fn check_prework_request(target: Target<'_>, tasks: &[Task], gates: &GateConfig) -> GateDecision {
    match target {
        Target::Id(id) => match find_by_id(id, tasks) {
            Some(task) => check_prework(Some(task), tasks, gates),
            None => GateDecision::Block(BlockReason {
                gate: GateKind::PreWork,
                task_ids: vec![id.trim().to_string()],
                kind: BlockKind::UnknownTask {
                    id: id.trim().to_string(),
                },
                directive: format!(
                    "Task '{}' does not exist in the checklist. Use an id listed by `taskgate status`.",
                    id.trim()
                ),
            }),
        },
        Target::Prompt(prompt) => check_prework(match_task(prompt, tasks), tasks, gates),
        Target::Unspecified => check_prework(None, tasks, gates),
    }
}

/// Apply the pre-work gate to an already-resolved target.
///
/// - target dev in progress: allow (resuming declared work)
/// - target dev complete without a verified success: block; a recorded
///   failure routes to `taskgate rework`, anything else to verification
/// - otherwise: allow only if no other task occupies the in-flight slot
/// - no target: block if anything at all occupies the slot
///
/// A task occupies the slot while its dev field is in progress, or while it
/// is dev-complete without a verified success. A recorded verification
/// failure keeps occupying the slot until rework resets it, after which the
/// task is in progress again and can be resumed.
pub fn check_prework(target: Option<&Task>, tasks: &[Task], gates: &GateConfig) -> GateDecision {
    let Some(target) = target else {
        return slot_check(None, tasks, gates);
    };

    let dev = target.state(&gates.dev_field);
    let verification = target.state(&gates.verification_field);

    if dev == State::InProgress {
        return GateDecision::Allow;
    }

    if dev == State::Complete && verification != State::VerifiedSuccess {
        let record = target.field(&gates.verification_field);
        let line = record
            .and_then(|f| f.line)
            .map(|l| format!(" (line {})", l))
            .unwrap_or_default();

        if verification == State::VerifiedFailure {
            let reason = record.and_then(|f| f.reason.clone());
            let directive = format!(
                "{} failed verification{}{}. Run `taskgate rework {}` to send it back to the {} role \
                 before doing more work on it.",
                target.id,
                line,
                reason_suffix(reason.as_deref()),
                target.id,
                gates.implementer_role
            );
            return GateDecision::Block(BlockReason {
                gate: GateKind::PreWork,
                task_ids: vec![target.id.clone()],
                kind: BlockKind::TargetNeedsRework { reason },
                directive,
            });
        }

        return GateDecision::Block(BlockReason {
            gate: GateKind::PreWork,
            task_ids: vec![target.id.clone()],
            kind: BlockKind::TargetNeedsVerification,
            directive: format!(
                "{} is implemented but its {} field is still not verified{}. \
                 Run verification for {} and record the result before doing more work on it.",
                target.id, gates.verification_field, line, target.id
            ),
        });
    }

    slot_check(Some(target), tasks, gates)
}

fn slot_check(target: Option<&Task>, tasks: &[Task], gates: &GateConfig) -> GateDecision {
    let mut in_progress = Vec::new();
    let mut unverified = Vec::new();
    let mut details = Vec::new();

    for task in tasks {
        if target.is_some_and(|t| t.id == task.id) {
            continue;
        }
        let dev = task.state(&gates.dev_field);
        let verification = task.state(&gates.verification_field);
        if dev == State::InProgress {
            in_progress.push(task.id.clone());
            details.push(format!(
                "  - {} (line {}): {} is in progress",
                task.id, task.line, gates.dev_field
            ));
        } else if dev == State::Complete && verification != State::VerifiedSuccess {
            unverified.push(task.id.clone());
            let note = match task.field(&gates.verification_field) {
                Some(f) if f.state == State::VerifiedFailure => {
                    format!("verification failed{}", reason_suffix(f.reason.as_deref()))
                }
                _ => "implemented but not verified".to_string(),
            };
            details.push(format!("  - {} (line {}): {}", task.id, task.line, note));
        }
    }

    if in_progress.is_empty() && unverified.is_empty() {
        return GateDecision::Allow;
    }

    let task_ids: Vec<String> = in_progress.iter().chain(unverified.iter()).cloned().collect();
    let subject = match target {
        Some(t) => format!("Cannot start {}", t.id),
        None => "Cannot start new work".to_string(),
    };
    let mut directive = format!(
        "{}: other work is still in flight.\n{}\n",
        subject,
        details.join("\n")
    );
    if !in_progress.is_empty() {
        directive.push_str(&format!(
            "Finish {} with the {} role first.\n",
            in_progress.join(", "),
            gates.implementer_role
        ));
    }
    if !unverified.is_empty() {
        directive.push_str(&format!(
            "Verify (or rework after a failed verification) {} before starting anything else.\n",
            unverified.join(", ")
        ));
    }

    GateDecision::Block(BlockReason {
        gate: GateKind::PreWork,
        task_ids,
        kind: BlockKind::SlotOccupied {
            in_progress,
            unverified,
        },
        directive: directive.trim_end().to_string(),
    })
}

fn reason_suffix(reason: Option<&str>) -> String {
    reason.map(|r| format!(": {}", r)).unwrap_or_default()
}
