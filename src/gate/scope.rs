//! Scope gate: source edits require a declared active scope.
//!
//! This closes the gap where an agent never names a task the pre-work gate
//! could resolve. Documentation, configuration, and the checklist itself are
//! exempt so that planning and status updates stay possible.

use super::{BlockKind, BlockReason, GateDecision, GateKind};
use crate::config::Config;
use crate::scope_record::ActiveScope;
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Check whether editing `path` is allowed under `scope`.
///
/// `path` is repo-relative; backslashes are accepted and `..` segments are
/// resolved before matching. A path that escapes the project root is never
/// exempt. Invalid exempt globs are skipped with a warning (config
/// validation rejects them earlier), so a bad glob can only make the gate
/// stricter.
pub fn check_edit(path: &str, scope: &ActiveScope, config: &Config) -> GateDecision {
    let normalized = normalize_path(path);
    let exempt = normalized.as_deref().is_some_and(|p| is_exempt(p, config));

    if exempt || !scope.is_empty() {
        return GateDecision::Allow;
    }

    let shown = normalized.unwrap_or_else(|| forward_slashes(path));
    GateDecision::Block(BlockReason {
        gate: GateKind::Scope,
        task_ids: Vec::new(),
        kind: BlockKind::NoActiveScope {
            path: shown.clone(),
        },
        directive: format!(
            "No active scope is declared, so '{}' cannot be edited.\n\
             Declare the task you are working on first:\n  taskgate scope set <TASK-ID>",
            shown
        ),
    })
}

/// Whether `path` may be edited without an active scope.
pub fn is_exempt_path(path: &str, config: &Config) -> bool {
    normalize_path(path).is_some_and(|p| is_exempt(&p, config))
}

fn is_exempt(path: &str, config: &Config) -> bool {
    if normalize_path(&config.task_file).as_deref() == Some(path) {
        return true;
    }
    exempt_globset(&config.gates.exempt_globs).is_match(path)
}

fn exempt_globset(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(&forward_slashes(pattern)) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => tracing::warn!(pattern = %pattern, error = %e, "skipping invalid exempt glob"),
        }
    }
    builder.build().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to build exempt globs; nothing is exempt");
        GlobSet::empty()
    })
}

/// Root-relative form with `.` dropped and `..` resolved lexically.
///
/// `None` for absolute paths and for paths that climb above the root.
fn normalize_path(path: &str) -> Option<String> {
    let replaced = forward_slashes(path);
    let drive = replaced.as_bytes().get(1) == Some(&b':');
    if replaced.starts_with('/') || drive {
        return None;
    }

    let mut parts: Vec<&str> = Vec::new();
    for segment in replaced.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            segment => parts.push(segment),
        }
    }
    Some(parts.join("/"))
}

/// Forward slashes, no leading `./`.
fn forward_slashes(path: &str) -> String {
    let replaced = path.trim().replace('\\', "/");
    replaced
        .strip_prefix("./")
        .map(str::to_string)
        .unwrap_or(replaced)
}
