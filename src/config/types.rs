//! Gate settings and defaults.

use crate::schema::FieldKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default path categories exempt from scope enforcement: documentation,
/// configuration, and taskgate's own state.
pub fn default_exempt_globs() -> Vec<String> {
    vec![
        "**/*.md".to_string(),
        "**/*.txt".to_string(),
        "docs/**".to_string(),
        "**/*.json".to_string(),
        "**/*.yaml".to_string(),
        "**/*.yml".to_string(),
        "**/*.toml".to_string(),
        "**/.env*".to_string(),
        ".taskgate/**".to_string(),
        ".claude/**".to_string(),
    ]
}

pub(crate) fn default_task_file() -> String {
    "tasks.md".to_string()
}
pub(crate) fn default_dev_field() -> FieldKey {
    FieldKey::Dev
}
pub(crate) fn default_verification_field() -> FieldKey {
    FieldKey::Qa
}
pub(crate) fn default_implementer_role() -> String {
    "dev".to_string()
}
pub(crate) fn default_verifier_roles() -> Vec<String> {
    vec!["qa".to_string(), "verifier".to_string()]
}

/// Settings shared by the three gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Field that tracks implementation progress.
    #[serde(default = "default_dev_field")]
    pub dev_field: FieldKey,

    /// Field whose success unlocks the next task.
    #[serde(default = "default_verification_field")]
    pub verification_field: FieldKey,

    /// Actor tag of the role that implements tasks. Block directives for a
    /// recorded failure route back to this role.
    #[serde(default = "default_implementer_role")]
    pub implementer_role: String,

    /// Actor tags whose reports are checked by the completion gate.
    #[serde(default = "default_verifier_roles")]
    pub verifier_roles: Vec<String>,

    /// Glob patterns (repo-relative) that may be edited without an active scope.
    #[serde(default = "default_exempt_globs")]
    pub exempt_globs: Vec<String>,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            dev_field: default_dev_field(),
            verification_field: default_verification_field(),
            implementer_role: default_implementer_role(),
            verifier_roles: default_verifier_roles(),
            exempt_globs: default_exempt_globs(),
            extra: BTreeMap::new(),
        }
    }
}

impl GateConfig {
    /// Whether `actor` is one of the verifier roles (case-insensitive).
    pub fn is_verifier(&self, actor: &str) -> bool {
        self.verifier_roles
            .iter()
            .any(|r| r.eq_ignore_ascii_case(actor.trim()))
    }

    /// Whether `actor` is the implementing role (case-insensitive).
    pub fn is_implementer(&self, actor: &str) -> bool {
        self.implementer_role.eq_ignore_ascii_case(actor.trim())
    }
}
