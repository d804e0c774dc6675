//! The built-in default schema.
//!
//! Used when a project has no schema yet, when the configured one fails
//! validation on the gating path, and when an inference sample is too small.

use super::model::{
    CURRENT_SCHEMA_VERSION, FORMAT_MARKDOWN_CHECKLIST, FieldKey, FieldSemantics, LinePattern,
    Schema,
};
use crate::status::{FieldKind, State};
use std::collections::BTreeMap;

/// `- [ ] - **T001: Add login route**`
pub const DEFAULT_TASK_LINE: &str = r"^\s*[-*+]\s*\[(?P<checkbox>[ xX])\]\s*(?:-\s*)?(?:\*\*)?(?P<id>[A-Za-z]+[-_]?\d+)\b[:.]?\s*(?P<description>.*?)(?:\*\*)?\s*$";

/// `  - [ ] - Dev Status: [Not Started]`
pub const DEFAULT_STATUS_LINE: &str = r"^\s*[-*+]\s*\[(?P<checkbox>[ xX])\]\s*(?:-\s*)?(?P<label>[^:\[\]]+?)\s*:\s*\[(?P<value>[^\]]*)\]\s*$";

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn semantics(
    kind: FieldKind,
    states: &[(State, &[&str])],
    failure_pattern: Option<&str>,
) -> FieldSemantics {
    FieldSemantics {
        kind: Some(kind),
        states: states
            .iter()
            .map(|(state, variants)| (*state, strings(variants)))
            .collect(),
        failure_pattern: failure_pattern.map(str::to_string),
    }
}

impl Schema {
    /// The fixed schema for the bullet-checkbox task file layout.
    pub fn builtin_default() -> Self {
        let mut field_mapping = BTreeMap::new();
        field_mapping.insert(
            FieldKey::Dev,
            strings(&["Dev Status", "Development Status", "Dev"]),
        );
        field_mapping.insert(
            FieldKey::Qa,
            strings(&["QA Status", "QA", "Quality Assurance Status"]),
        );
        field_mapping.insert(
            FieldKey::UserVerification,
            strings(&["User Verification", "User Verification Status"]),
        );

        let mut status_semantics = BTreeMap::new();
        status_semantics.insert(
            FieldKey::Dev,
            semantics(
                FieldKind::Progress,
                &[
                    (State::NotStarted, &["Not Started", "Pending", "TODO"]),
                    (State::InProgress, &["In Progress", "Started", "WIP"]),
                    (State::Complete, &["Complete", "Completed", "Done"]),
                ],
                None,
            ),
        );
        status_semantics.insert(
            FieldKey::Qa,
            semantics(
                FieldKind::Verification,
                &[
                    (State::NotVerified, &["Not Started", "Not Verified", "Pending"]),
                    (State::VerifiedSuccess, &["Passed", "Pass", "Verified"]),
                    (State::VerifiedFailure, &["Failed", "Fail"]),
                ],
                Some(r"^Failed - (?P<reason>.+)$"),
            ),
        );
        status_semantics.insert(
            FieldKey::UserVerification,
            semantics(
                FieldKind::Verification,
                &[
                    (State::NotVerified, &["Not Started", "Pending"]),
                    (State::VerifiedSuccess, &["Verified", "Approved", "Passed"]),
                    (State::VerifiedFailure, &["Rejected", "Failed"]),
                ],
                Some(r"^(?:Rejected|Failed) - (?P<reason>.+)$"),
            ),
        );

        Self {
            version: Some(CURRENT_SCHEMA_VERSION.to_string()),
            format_type: FORMAT_MARKDOWN_CHECKLIST.to_string(),
            task_line: Some(LinePattern::new(DEFAULT_TASK_LINE)),
            status_line: Some(LinePattern::new(DEFAULT_STATUS_LINE)),
            field_mapping,
            status_semantics,
            confidence: 1.0,
            match_rate: None,
            last_validated: None,
        }
    }
}
