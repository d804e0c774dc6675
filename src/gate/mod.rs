//! Workflow gates.
//!
//! Three policies share the parsed task list:
//!
//! - **pre-work** (`check_prework`): one task in flight at a time, and
//!   finished work must be verified before the next task starts
//! - **scope** (`check_edit`): source edits need a declared active scope
//! - **completion** (`check_completion`): a verifier's verdict must be
//!   recorded in the checklist (value and checkbox) before it may finish
//!
//! A block is an ordinary outcome, not an error. Its directive names the
//! task ids, fields, and lines involved so that the acting agent can fix the
//! problem without re-reading the checklist.

mod completion;
mod prework;
mod scope;

#[cfg(test)]
mod tests;

pub use completion::{Verdict, check_completion, extract_verdict};
pub use prework::{Target, check_prework, check_prework_request};
pub use scope::{check_edit, is_exempt_path};

use crate::schema::FieldKey;
use serde::Serialize;
use std::fmt;

/// Which gate produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    PreWork,
    Scope,
    Completion,
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateKind::PreWork => write!(f, "pre-work"),
            GateKind::Scope => write!(f, "scope"),
            GateKind::Completion => write!(f, "completion"),
        }
    }
}

/// What is wrong with one task's verification record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum RecordIssue {
    /// Neither the value nor the checkbox reflects the verdict.
    NeitherUpdated { expected: String },
    /// The checkbox is checked but the value was not updated.
    CheckboxOnly { expected: String },
    /// The value was updated but the checkbox is not checked.
    ValueOnly,
    /// The recorded value says the opposite of the verdict.
    ContradictsVerdict { verdict: Verdict, recorded: String },
    /// Failure correctly recorded; the work must go back to the implementer.
    RecordedFailure { reason: Option<String> },
    /// The scoped task id does not exist in the checklist.
    UnknownTask,
}

/// One task-level problem found by the completion gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordProblem {
    pub task_id: String,
    pub field: FieldKey,
    /// Status line to edit, when the field has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(flatten)]
    pub issue: RecordIssue,
}

/// Structured cause of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockKind {
    /// Other work occupies the single in-flight slot.
    SlotOccupied {
        in_progress: Vec<String>,
        unverified: Vec<String>,
    },
    /// The target is implemented but not yet verified.
    TargetNeedsVerification,
    /// The target failed verification and has not been reset for rework.
    TargetNeedsRework { reason: Option<String> },
    /// An explicitly named task id does not exist.
    UnknownTask { id: String },
    /// A source edit was attempted with no active scope.
    NoActiveScope { path: String },
    /// The checklist does not correctly record the verification outcome.
    Completion { problems: Vec<RecordProblem> },
}

/// Why a gate blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockReason {
    pub gate: GateKind,
    /// Task ids responsible for the block.
    pub task_ids: Vec<String>,
    #[serde(flatten)]
    pub kind: BlockKind,
    /// Instruction text for the acting agent.
    pub directive: String,
}

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Block(BlockReason),
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow)
    }

    pub fn block_reason(&self) -> Option<&BlockReason> {
        match self {
            GateDecision::Allow => None,
            GateDecision::Block(reason) => Some(reason),
        }
    }
}
