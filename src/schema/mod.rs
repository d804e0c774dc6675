//! Parsing schema for checklist-style task files.
//!
//! A schema says how to find task lines and status lines, which raw labels
//! name which semantic field, and which raw values mean which state. Schemas
//! live in the project config, can be inferred from a sample (see `infer`),
//! and are validated and compiled once per invocation.

mod compile;
mod defaults;
mod model;


pub use compile::{CompiledLine, CompiledSchema};
pub use defaults::{DEFAULT_STATUS_LINE, DEFAULT_TASK_LINE};
pub use model::{
    CURRENT_SCHEMA_VERSION, CaptureGroups, FORMAT_CUSTOM, FORMAT_MARKDOWN_CHECKLIST,
    FORMAT_NUMBERED_LIST, FieldKey, FieldSemantics, LinePattern, SUPPORTED_SCHEMA_VERSIONS,
    Schema,
};

pub(crate) use compile::{CompiledField, ReasonSource, literal_prefix};

use crate::config::Config;
use crate::error::{Result, TaskgateError};

impl Schema {
    /// Parse a schema from YAML without validating it.
    ///
    /// YAML syntax errors are reported as schema validation errors so that
    /// callers only ever handle one error kind for a bad schema.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| TaskgateError::schema("<document>", format!("invalid YAML: {}", e)))
    }

    /// Serialize the schema to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| TaskgateError::UserError(format!("failed to serialize schema: {}", e)))
    }
}

/// Compile the project's schema for use on a gating path.
///
/// A missing schema silently uses the built-in default. An invalid one,
/// whether badly shaped or failing to compile, also uses the default but
/// logs a warning naming the failing key: a broken schema must never crash
/// a gate.
pub fn load_for_gating(config: &Config) -> CompiledSchema {
    match config.schema().and_then(|schema| schema.map(|s| s.compile()).transpose()) {
        Ok(Some(compiled)) => compiled,
        Ok(None) => builtin(),
        Err(err) => {
            tracing::warn!(error = %err, "configured schema is invalid; using built-in default");
            builtin()
        }
    }
}

/// The built-in default schema, compiled.
pub fn builtin() -> CompiledSchema {
    match Schema::builtin_default().compile() {
        Ok(compiled) => compiled,
        Err(err) => unreachable!("built-in schema must compile: {}", err),
    }
}
