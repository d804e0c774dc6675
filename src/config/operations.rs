//! Config loading, validation, and saving.

use super::model::Config;
use crate::error::{Result, TaskgateError};
use crate::schema::Schema;
use globset::Glob;
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(TaskgateError::Io)` - The file could not be read
    /// * `Err(TaskgateError::UserError)` - Parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| TaskgateError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Load config, falling back to defaults when the file is missing.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    ///
    /// The embedded schema is deserialized but not compiled here; schema
    /// problems are reported (or recovered from) where the schema is used.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| TaskgateError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// The configured schema, if any.
    ///
    /// A stored value that does not have the shape of a schema (a string
    /// confidence, a list where a mapping belongs) is a schema validation
    /// error, like any other schema defect.
    pub fn schema(&self) -> Result<Option<Schema>> {
        match &self.schema {
            None => Ok(None),
            Some(value) => serde_yaml::from_value(value.clone())
                .map(Some)
                .map_err(|e| TaskgateError::schema("<document>", e.to_string())),
        }
    }

    /// Replace the configured schema.
    pub fn set_schema(&mut self, schema: &Schema) -> Result<()> {
        let value = serde_yaml::to_value(schema).map_err(|e| {
            TaskgateError::UserError(format!("failed to serialize schema: {}", e))
        })?;
        self.schema = Some(value);
        Ok(())
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            TaskgateError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Atomically write the config to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        crate::fs::atomic_write_file(path, &yaml)
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - `task_file` must be non-empty
    /// - `gates.dev_field` and `gates.verification_field` must differ
    /// - `gates.exempt_globs` must all be valid globs
    pub fn validate(&self) -> Result<()> {
        if self.task_file.trim().is_empty() {
            return Err(TaskgateError::UserError(
                "config validation failed: task_file must be non-empty".to_string(),
            ));
        }

        if self.gates.dev_field == self.gates.verification_field {
            return Err(TaskgateError::UserError(format!(
                "config validation failed: gates.dev_field and gates.verification_field \
                 must differ (both are '{}')",
                self.gates.dev_field
            )));
        }

        for pattern in &self.gates.exempt_globs {
            Glob::new(pattern).map_err(|e| {
                TaskgateError::UserError(format!(
                    "config validation failed: invalid glob in gates.exempt_globs: '{}' - {}",
                    pattern, e
                ))
            })?;
        }

        Ok(())
    }
}
