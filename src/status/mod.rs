//! Status normalization.
//!
//! Maps raw status strings (whatever a project writes between the brackets)
//! onto a small semantic vocabulary. Unrecognized values always map to the
//! weakest state of the field's kind: an unknown value must never read as
//! done or verified.

use crate::error::TaskgateError;
use crate::schema::{CompiledSchema, FieldKey, ReasonSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;


/// Whether a field tracks work progress or a verification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Progress,
    Verification,
}

impl FieldKind {
    /// The least-permissive state for this kind.
    pub fn weakest(self) -> State {
        match self {
            FieldKind::Progress => State::NotStarted,
            FieldKind::Verification => State::NotVerified,
        }
    }

    /// All states valid for this kind, weakest first.
    pub fn states(self) -> &'static [State] {
        match self {
            FieldKind::Progress => &[State::NotStarted, State::InProgress, State::Complete],
            FieldKind::Verification => &[
                State::NotVerified,
                State::VerifiedSuccess,
                State::VerifiedFailure,
            ],
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Progress => write!(f, "progress"),
            FieldKind::Verification => write!(f, "verification"),
        }
    }
}

/// Semantic state of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    NotStarted,
    InProgress,
    Complete,
    NotVerified,
    VerifiedSuccess,
    VerifiedFailure,
}

impl State {
    pub fn kind(self) -> FieldKind {
        match self {
            State::NotStarted | State::InProgress | State::Complete => FieldKind::Progress,
            State::NotVerified | State::VerifiedSuccess | State::VerifiedFailure => {
                FieldKind::Verification
            }
        }
    }

    pub fn is_weakest(self) -> bool {
        self == self.kind().weakest()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            State::NotStarted => "not_started",
            State::InProgress => "in_progress",
            State::Complete => "complete",
            State::NotVerified => "not_verified",
            State::VerifiedSuccess => "verified_success",
            State::VerifiedFailure => "verified_failure",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = TaskgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "not_started" => Ok(State::NotStarted),
            "in_progress" => Ok(State::InProgress),
            "complete" => Ok(State::Complete),
            "not_verified" => Ok(State::NotVerified),
            "verified_success" => Ok(State::VerifiedSuccess),
            "verified_failure" => Ok(State::VerifiedFailure),
            other => Err(TaskgateError::UserError(format!(
                "unknown state '{}' (expected one of: not_started, in_progress, complete, \
                 not_verified, verified_success, verified_failure)",
                other
            ))),
        }
    }
}

/// Result of normalizing a raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub state: State,
    /// Free-text reason captured by a failure expression.
    pub reason: Option<String>,
}

impl Normalized {
    fn state(state: State) -> Self {
        Self {
            state,
            reason: None,
        }
    }
}

/// Normalize a raw status value for `field`.
///
/// Order: the field's open-ended failure expression, then the enumerated
/// variants (trimmed, case-insensitive), then the weakest state with a
/// warning.
pub fn normalize(raw: &str, field: &FieldKey, schema: &CompiledSchema) -> Normalized {
    let trimmed = raw.trim();
    let Some(compiled) = schema.field(field) else {
        tracing::warn!(field = %field, value = trimmed, "field has no status vocabulary; treating as weakest state");
        return Normalized::state(field.default_kind().weakest());
    };

    if let Some(failure) = &compiled.failure
        && let Some(caps) = failure.regex.captures(trimmed)
    {
        let reason = match &failure.reason {
            ReasonSource::Named => caps.name("reason").map(|m| m.as_str().trim().to_string()),
            ReasonSource::FirstGroup => caps.get(1).map(|m| m.as_str().trim().to_string()),
            ReasonSource::AfterPrefix(prefix) => Some(strip_prefix_ignore_case(trimmed, prefix)),
        };
        return Normalized {
            state: State::VerifiedFailure,
            reason: reason.filter(|r| !r.is_empty()),
        };
    }

    if let Some(state) = compiled.lookup.get(&trimmed.to_lowercase()) {
        return Normalized::state(*state);
    }

    let weakest = compiled.kind.weakest();
    tracing::warn!(
        field = %field,
        value = trimmed,
        fallback = %weakest,
        "unrecognized status value"
    );
    Normalized::state(weakest)
}

/// The canonical raw form of `state` for `field`: its first listed variant.
pub fn canonical<'a>(field: &FieldKey, state: State, schema: &'a CompiledSchema) -> Option<&'a str> {
    schema
        .field(field)
        .and_then(|f| f.canonical.get(&state))
        .map(String::as_str)
}

/// Text after `prefix`, or the whole value when it does not start with it.
fn strip_prefix_ignore_case(value: &str, prefix: &str) -> String {
    match value.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => value[prefix.len()..].trim().to_string(),
        _ => value.to_string(),
    }
}
