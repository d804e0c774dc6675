//! Host event adapter.
//!
//! An agent host calls `taskgate hook` around actions, passing one JSON
//! event on stdin:
//!
//! ```json
//! { "event": "before_action", "actor": "dev", "text": "start T002", "path": "src/lib.rs" }
//! ```
//!
//! Every invocation loads config, schema, checklist, and active scope
//! fresh, runs the gates that apply to the event, and answers with a JSON
//! decision. Which gates run:
//!
//! | event                              | actor            | gate                        |
//! |------------------------------------|------------------|-----------------------------|
//! | `before_action` with `path`        | any              | scope                       |
//! | `before_action` with id or text    | implementer/none | pre-work on that target     |
//! | `before_action`, source `path` only | implementer/none | pre-work on the scoped tasks |
//! | bare `before_action`               | implementer/none | pre-work on the whole set   |
//! | `after_action`, `before_finish`    | verifier         | completion                  |

use crate::config::{Config, GateConfig};
use crate::context::ProjectContext;
use crate::error::{Result, TaskgateError};
use crate::gate::{self, BlockReason, GateDecision, Target};
use crate::matcher::find_by_id;
use crate::parser::{self, Task};
use crate::schema::{self, CompiledSchema};
use crate::scope_record::ActiveScope;
use serde::{Deserialize, Serialize};

/// Point in the host's action lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    BeforeAction,
    AfterAction,
    BeforeFinish,
}

/// One host event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookEvent {
    pub event: EventKind,

    /// Role tag of the acting agent.
    #[serde(default)]
    pub actor: Option<String>,

    /// Prompt text (before) or report text (after/finish).
    #[serde(default)]
    pub text: Option<String>,

    /// File about to be edited.
    #[serde(default)]
    pub path: Option<String>,

    /// Explicit task id; preferred over matching `text`.
    #[serde(default)]
    pub task_id: Option<String>,
}

impl HookEvent {
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input)
            .map_err(|e| TaskgateError::UserError(format!("invalid hook event JSON: {}", e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Block,
}

/// JSON answer written to stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookResponse {
    pub decision: Decision,

    /// Directive text for the acting agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    pub task_ids: Vec<String>,

    /// Structured block detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockReason>,
}

impl From<GateDecision> for HookResponse {
    fn from(decision: GateDecision) -> Self {
        match decision {
            GateDecision::Allow => Self {
                decision: Decision::Allow,
                reason: None,
                task_ids: Vec::new(),
                block: None,
            },
            GateDecision::Block(block) => Self {
                decision: Decision::Block,
                reason: Some(block.directive.clone()),
                task_ids: block.task_ids.clone(),
                block: Some(block),
            },
        }
    }
}

/// Run the gates that apply to `event`.
pub fn handle(event: &HookEvent, ctx: &ProjectContext) -> Result<GateDecision> {
    let config = ctx.load_config()?;
    let actor = event.actor.as_deref().map(str::trim).filter(|a| !a.is_empty());

    match event.event {
        EventKind::BeforeAction => {
            let scope = ActiveScope::load(ctx.scope_path())?;
            let path = event.path.as_deref().map(|p| ctx.relative_path(p));
            if let Some(path) = path.as_deref() {
                let decision = gate::check_edit(path, &scope, &config);
                if !decision.is_allowed() {
                    return Ok(decision);
                }
            }

            if !actor.is_none_or(|a| config.gates.is_implementer(a)) {
                return Ok(GateDecision::Allow);
            }

            let (tasks, _) = load_tasks(ctx, &config)?;
            let task_id = event.task_id.as_deref().filter(|id| !id.trim().is_empty());
            let text = event.text.as_deref().filter(|t| !t.trim().is_empty());
            let target = match (task_id, text) {
                (Some(id), _) => Target::Id(id),
                (None, Some(text)) => Target::Prompt(text),
                (None, None) => match path.as_deref() {
                    Some(path) if gate::is_exempt_path(path, &config) => {
                        return Ok(GateDecision::Allow);
                    }
                    Some(_) => return Ok(check_scoped_edit(&scope, &tasks, &config.gates)),
                    None => Target::Unspecified,
                },
            };
            Ok(gate::check_prework_request(target, &tasks, &config.gates))
        }
        EventKind::AfterAction | EventKind::BeforeFinish => {
            if !actor.is_some_and(|a| config.gates.is_verifier(a)) {
                return Ok(GateDecision::Allow);
            }
            let scope = ActiveScope::load(ctx.scope_path())?;
            if scope.is_empty() {
                return Ok(GateDecision::Allow);
            }
            let (tasks, schema) = load_tasks(ctx, &config)?;
            let report = event.text.as_deref().unwrap_or_default();
            Ok(gate::check_completion(
                report,
                &scope,
                &tasks,
                &schema,
                &config.gates,
            ))
        }
    }
}

/// Pre-work check for a source edit that names no task: the edit works on
/// the scoped tasks. Scoped ids missing from the checklist are skipped.
fn check_scoped_edit(scope: &ActiveScope, tasks: &[Task], gates: &GateConfig) -> GateDecision {
    for id in &scope.task_ids {
        if let Some(task) = find_by_id(id, tasks) {
            let decision = gate::check_prework(Some(task), tasks, gates);
            if !decision.is_allowed() {
                return decision;
            }
        }
    }
    GateDecision::Allow
}

/// Parse the checklist with the project's schema.
///
/// A missing checklist is an empty task list: there is nothing to gate yet.
pub fn load_tasks(ctx: &ProjectContext, config: &Config) -> Result<(Vec<Task>, CompiledSchema)> {
    let schema = schema::load_for_gating(config);
    let path = ctx.task_file_path(config);
    if !path.exists() {
        tracing::warn!(path = %path.display(), "checklist not found; no tasks to gate");
        return Ok((Vec::new(), schema));
    }
    let text = ctx.read_task_file(config)?;
    Ok((parser::parse(&text, &schema), schema))
}
