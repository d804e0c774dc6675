//! The active-scope record.
//!
//! An explicitly declared set of task ids that are "in flight". It is stored
//! apart from the checklist in `.taskgate/active_scope.json`, read fresh on
//! every invocation, and written back atomically.
//!
//! ```json
//! {
//!   "task_ids": ["T001"],
//!   "declared_at": "2026-01-13T10:00:00Z",
//!   "declared_by": "dev"
//! }
//! ```

use crate::error::{Result, TaskgateError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Task ids currently declared as in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveScope {
    #[serde(default)]
    pub task_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_by: Option<String>,
}

impl ActiveScope {
    /// Load the record; a missing file is an empty scope.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| TaskgateError::io(path, e))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).map_err(|e| {
            TaskgateError::UserError(format!(
                "failed to parse active scope '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Atomically write the record.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self).map_err(|e| {
            TaskgateError::UserError(format!("failed to serialize active scope: {}", e))
        })?;
        json.push('\n');
        crate::fs::atomic_write_file(path, &json)
    }

    pub fn is_empty(&self) -> bool {
        self.task_ids.is_empty()
    }

    /// Whether `id` is in scope (case-insensitive).
    pub fn contains(&self, id: &str) -> bool {
        self.task_ids.iter().any(|t| t.eq_ignore_ascii_case(id))
    }

    /// Replace the scope with `ids`.
    pub fn declare(&mut self, ids: &[String], actor: Option<&str>) {
        self.task_ids.clear();
        self.add(ids, actor);
    }

    /// Add `ids`, skipping ones already present. Returns how many were added.
    pub fn add(&mut self, ids: &[String], actor: Option<&str>) -> usize {
        let mut added = 0;
        for id in ids {
            let id = id.trim();
            if id.is_empty() || self.contains(id) {
                continue;
            }
            self.task_ids.push(id.to_string());
            added += 1;
        }
        self.stamp(actor);
        added
    }

    /// Remove `ids`. Returns how many were removed.
    pub fn remove(&mut self, ids: &[String]) -> usize {
        let before = self.task_ids.len();
        self.task_ids
            .retain(|t| !ids.iter().any(|id| id.trim().eq_ignore_ascii_case(t)));
        before - self.task_ids.len()
    }

    pub fn clear(&mut self) {
        self.task_ids.clear();
        self.declared_at = None;
        self.declared_by = None;
    }

    fn stamp(&mut self, actor: Option<&str>) {
        self.declared_at = Some(Utc::now());
        self.declared_by = actor.map(str::to_string);
    }
}
