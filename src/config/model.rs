//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Project configuration record.
///
/// This struct represents the contents of `.taskgate/config.yaml`. The
/// parsing schema is stored here alongside its validation metadata.
/// Unknown fields are preserved for forward compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Checklist file path, relative to the project root.
    #[serde(default = "default_task_file")]
    pub task_file: String,

    /// Parsing schema as stored; absent means the built-in default.
    ///
    /// Kept as raw YAML so that a badly typed schema never fails the config
    /// load. Read it through [`Config::schema`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_yaml::Value>,

    /// Gate settings.
    #[serde(default)]
    pub gates: GateConfig,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            task_file: default_task_file(),
            schema: None,
            gates: GateConfig::default(),
            extra: BTreeMap::new(),
        }
    }
}
