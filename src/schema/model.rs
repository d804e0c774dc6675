//! Serializable schema types.
//!
//! A `Schema` is plain data: patterns are strings and field vocabularies are
//! lists. Nothing here is compiled; see `compile.rs` for the validated form.

use crate::status::{FieldKind, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Schema versions this build can parse with.
pub const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["1.0"];

/// Version stamped on schemas produced by this build.
pub const CURRENT_SCHEMA_VERSION: &str = "1.0";

/// Format type used when nothing better was detected.
pub const FORMAT_CUSTOM: &str = "custom";

/// Bullet-and-checkbox style (`- [ ] ...`).
pub const FORMAT_MARKDOWN_CHECKLIST: &str = "markdown-checklist";

/// Numbered list style (`1. ...`).
pub const FORMAT_NUMBERED_LIST: &str = "numbered-list";

/// Semantic field key.
///
/// The three well-known keys drive the gates; anything else an inferred
/// schema discovers is carried as a slugified `Custom` key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKey {
    Dev,
    Qa,
    UserVerification,
    Custom(String),
}

impl FieldKey {
    pub fn as_str(&self) -> &str {
        match self {
            FieldKey::Dev => "dev",
            FieldKey::Qa => "qa",
            FieldKey::UserVerification => "user_verification",
            FieldKey::Custom(slug) => slug,
        }
    }

    /// Field kind assumed when the schema does not say.
    pub fn default_kind(&self) -> FieldKind {
        match self {
            FieldKey::Qa | FieldKey::UserVerification => FieldKind::Verification,
            FieldKey::Dev | FieldKey::Custom(_) => FieldKind::Progress,
        }
    }
}

impl From<String> for FieldKey {
    fn from(value: String) -> Self {
        match value.as_str() {
            "dev" => FieldKey::Dev,
            "qa" => FieldKey::Qa,
            "user_verification" => FieldKey::UserVerification,
            _ => FieldKey::Custom(value),
        }
    }
}

impl From<&str> for FieldKey {
    fn from(value: &str) -> Self {
        FieldKey::from(value.to_string())
    }
}

impl From<FieldKey> for String {
    fn from(key: FieldKey) -> Self {
        key.as_str().to_string()
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of the capture groups that carry each role in a line pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureGroups {
    pub id: String,
    pub description: String,
    pub label: String,
    pub value: String,
    pub checkbox: String,
}

impl Default for CaptureGroups {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            description: "description".to_string(),
            label: "label".to_string(),
            value: "value".to_string(),
            checkbox: "checkbox".to_string(),
        }
    }
}

/// A line-matching regex plus the capture roles it provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePattern {
    pub pattern: String,

    #[serde(default)]
    pub groups: CaptureGroups,
}

impl LinePattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            groups: CaptureGroups::default(),
        }
    }
}

/// Raw value vocabulary for one semantic field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSemantics {
    /// Progress or verification; derived from the key when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FieldKind>,

    /// Semantic state -> raw variants. The first variant is the canonical form.
    pub states: BTreeMap<State, Vec<String>>,

    /// Open-ended failure expression (verification fields only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_pattern: Option<String>,
}

/// Description of how to parse one project's checklist file.
///
/// Required keys are optional at the type level so that a missing key is
/// reported by `Schema::compile` with its name instead of a serde error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default = "default_format_type")]
    pub format_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_line: Option<LinePattern>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_line: Option<LinePattern>,

    #[serde(default)]
    pub field_mapping: BTreeMap<FieldKey, Vec<String>>,

    #[serde(default)]
    pub status_semantics: BTreeMap<FieldKey, FieldSemantics>,

    /// Inference confidence in `[0.0, 1.0]`.
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Fraction of detected ids recovered at the last validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_rate: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_validated: Option<DateTime<Utc>>,
}

fn default_format_type() -> String {
    FORMAT_CUSTOM.to_string()
}

fn default_confidence() -> f64 {
    1.0
}

impl Schema {
    /// Kind of a field, honoring an explicit `kind` in `status_semantics`.
    pub fn field_kind(&self, key: &FieldKey) -> FieldKind {
        self.status_semantics
            .get(key)
            .and_then(|s| s.kind)
            .unwrap_or_else(|| key.default_kind())
    }
}
