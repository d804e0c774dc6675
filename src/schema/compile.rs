//! Schema validation and compilation.
//!
//! `Schema::compile` is the single validation entry point: it checks the
//! version, required keys, capture roles, and field vocabularies, and
//! compiles every pattern exactly once. Parsing afterwards only runs the
//! pre-compiled matchers.

use super::model::{CaptureGroups, FieldKey, SUPPORTED_SCHEMA_VERSIONS, Schema};
use crate::error::{Result, TaskgateError};
use crate::status::{FieldKind, State};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};

/// A compiled line pattern with its capture roles.
#[derive(Debug, Clone)]
pub struct CompiledLine {
    pub(crate) regex: Regex,
    pub(crate) groups: CaptureGroups,
}

/// How to pull a failure reason out of a failure-expression match.
#[derive(Debug, Clone)]
pub(crate) enum ReasonSource {
    /// A capture group named `reason`.
    Named,
    /// The first positional capture group.
    FirstGroup,
    /// No groups: strip the expression's literal prefix from the raw value.
    AfterPrefix(String),
}

#[derive(Debug, Clone)]
pub(crate) struct FailureMatcher {
    pub(crate) regex: Regex,
    pub(crate) reason: ReasonSource,
}

/// Compiled vocabulary for one semantic field.
#[derive(Debug, Clone)]
pub(crate) struct CompiledField {
    pub(crate) kind: FieldKind,
    /// Lowercased raw variant -> state.
    pub(crate) lookup: HashMap<String, State>,
    /// State -> first listed variant.
    pub(crate) canonical: BTreeMap<State, String>,
    pub(crate) failure: Option<FailureMatcher>,
}

/// A validated schema with all matchers compiled.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    schema: Schema,
    pub(crate) task_line: CompiledLine,
    pub(crate) status_line: CompiledLine,
    /// Lowercased raw label -> semantic key.
    pub(crate) labels: HashMap<String, FieldKey>,
    pub(crate) fields: BTreeMap<FieldKey, CompiledField>,
}

impl CompiledSchema {
    /// The schema this was compiled from.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Semantic keys tracked by this schema, in key order.
    pub fn field_keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields.keys()
    }

    /// Kind of a field; unknown fields fall back to the key's default kind.
    pub fn field_kind(&self, key: &FieldKey) -> FieldKind {
        self.fields
            .get(key)
            .map(|f| f.kind)
            .unwrap_or_else(|| key.default_kind())
    }

    /// Resolve a raw status label to its semantic key.
    pub fn resolve_label(&self, label: &str) -> Option<&FieldKey> {
        self.labels.get(&label.trim().to_lowercase())
    }

    pub(crate) fn field(&self, key: &FieldKey) -> Option<&CompiledField> {
        self.fields.get(key)
    }
}

impl Schema {
    /// Validate this schema and compile its patterns.
    ///
    /// Every failure is a `TaskgateError::SchemaValidation` naming the key or
    /// pattern at fault.
    pub fn compile(&self) -> Result<CompiledSchema> {
        let version = self
            .version
            .as_deref()
            .ok_or_else(|| TaskgateError::schema("version", "missing required key"))?;
        if !SUPPORTED_SCHEMA_VERSIONS.contains(&version) {
            return Err(TaskgateError::schema(
                "version",
                format!(
                    "unsupported schema version '{}' (supported: {})",
                    version,
                    SUPPORTED_SCHEMA_VERSIONS.join(", ")
                ),
            ));
        }

        let task_line = self
            .task_line
            .as_ref()
            .ok_or_else(|| TaskgateError::schema("task_line", "missing required key"))?;
        let status_line = self
            .status_line
            .as_ref()
            .ok_or_else(|| TaskgateError::schema("status_line", "missing required key"))?;

        if self.field_mapping.is_empty() {
            return Err(TaskgateError::schema(
                "field_mapping",
                "missing required key (at least one field must be mapped)",
            ));
        }

        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(TaskgateError::schema(
                "confidence",
                format!("must be between 0.0 and 1.0 (found {})", self.confidence),
            ));
        }

        let task_regex = compile_pattern("task_line.pattern", &task_line.pattern)?;
        require_group(&task_regex, "task_line", "id", &task_line.groups.id)?;
        require_group(
            &task_regex,
            "task_line",
            "description",
            &task_line.groups.description,
        )?;

        let status_regex = compile_pattern("status_line.pattern", &status_line.pattern)?;
        require_group(&status_regex, "status_line", "label", &status_line.groups.label)?;
        require_group(&status_regex, "status_line", "value", &status_line.groups.value)?;

        let mut labels = HashMap::new();
        for (key, variants) in &self.field_mapping {
            for variant in variants {
                let normalized = variant.trim().to_lowercase();
                if normalized.is_empty() {
                    return Err(TaskgateError::schema(
                        format!("field_mapping.{}", key),
                        "label variants must be non-empty",
                    ));
                }
                if let Some(existing) = labels.insert(normalized, key.clone())
                    && existing != *key
                {
                    return Err(TaskgateError::schema(
                        format!("field_mapping.{}", key),
                        format!("label '{}' is already mapped to '{}'", variant, existing),
                    ));
                }
            }
        }

        let mut fields = BTreeMap::new();
        for key in self.field_mapping.keys().chain(self.status_semantics.keys()) {
            if fields.contains_key(key) {
                continue;
            }
            fields.insert(key.clone(), self.compile_field(key)?);
        }

        Ok(CompiledSchema {
            schema: self.clone(),
            task_line: CompiledLine {
                regex: task_regex,
                groups: task_line.groups.clone(),
            },
            status_line: CompiledLine {
                regex: status_regex,
                groups: status_line.groups.clone(),
            },
            labels,
            fields,
        })
    }

    fn compile_field(&self, key: &FieldKey) -> Result<CompiledField> {
        let kind = self.field_kind(key);
        let mut compiled = CompiledField {
            kind,
            lookup: HashMap::new(),
            canonical: BTreeMap::new(),
            failure: None,
        };

        let Some(semantics) = self.status_semantics.get(key) else {
            return Ok(compiled);
        };

        for (state, variants) in &semantics.states {
            let state_key = format!("status_semantics.{}.states.{}", key, state);
            if state.kind() != kind {
                return Err(TaskgateError::schema(
                    state_key,
                    format!("state '{}' is not valid for a {} field", state, kind),
                ));
            }
            for variant in variants {
                let normalized = variant.trim().to_lowercase();
                if normalized.is_empty() {
                    return Err(TaskgateError::schema(
                        state_key,
                        "status variants must be non-empty",
                    ));
                }
                if let Some(existing) = compiled.lookup.insert(normalized, *state)
                    && existing != *state
                {
                    return Err(TaskgateError::schema(
                        state_key,
                        format!("value '{}' is already listed under '{}'", variant, existing),
                    ));
                }
            }
            if let Some(first) = variants.first() {
                compiled.canonical.insert(*state, first.trim().to_string());
            }
        }

        if let Some(pattern) = &semantics.failure_pattern {
            let pattern_key = format!("status_semantics.{}.failure_pattern", key);
            if kind != FieldKind::Verification {
                return Err(TaskgateError::schema(
                    pattern_key,
                    "a failure expression is only valid on verification fields",
                ));
            }
            let regex = compile_pattern(&pattern_key, pattern)?;
            for (state, canonical) in &compiled.canonical {
                if *state != State::VerifiedFailure && regex.is_match(canonical) {
                    return Err(TaskgateError::schema(
                        pattern_key,
                        format!(
                            "expression also matches '{}', the canonical form of '{}'",
                            canonical, state
                        ),
                    ));
                }
            }
            let reason = if regex.capture_names().flatten().any(|n| n == "reason") {
                ReasonSource::Named
            } else if regex.captures_len() > 1 {
                ReasonSource::FirstGroup
            } else {
                ReasonSource::AfterPrefix(literal_prefix(pattern))
            };
            compiled.failure = Some(FailureMatcher { regex, reason });
        }

        Ok(compiled)
    }
}

fn compile_pattern(key: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| TaskgateError::schema(key, format!("pattern does not compile: {}", e)))
}

fn require_group(regex: &Regex, line: &str, role: &str, name: &str) -> Result<()> {
    if regex.capture_names().flatten().any(|n| n == name) {
        Ok(())
    } else {
        Err(TaskgateError::schema(
            format!("{}.groups.{}", line, role),
            format!("pattern does not define capture group '{}'", name),
        ))
    }
}

/// Leading literal text of a pattern, after an optional `^` anchor.
///
/// `^Failed - .*` yields `"Failed - "`. Stops at the first metacharacter and
/// gives up (returns what it has) on escapes.
pub(crate) fn literal_prefix(pattern: &str) -> String {
    pattern
        .strip_prefix('^')
        .unwrap_or(pattern)
        .chars()
        .take_while(|c| !".*+?()[]{}|\\$^".contains(*c))
        .collect()
}
