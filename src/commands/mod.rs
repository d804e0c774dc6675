//! Command implementations for taskgate.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the project loading shared by most of them.

mod gate;
mod hook;
mod infer;
mod init;
mod schema;
mod scope;
mod set_status;
mod status;

#[cfg(test)]
mod tests;

use crate::cli::{Command, GateAction, SchemaAction, ScopeAction};
use crate::config::Config;
use crate::context::ProjectContext;
use crate::error::{Result, TaskgateError};
use crate::gate::GateDecision;
use crate::matcher::find_by_id;
use crate::parser::{self, Task};
use crate::schema::CompiledSchema;

/// Dispatch a command to its implementation.
///
/// This is the main entry point for command execution. Each command
/// is routed to its handler function.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Init(args) => init::cmd_init(args),
        Command::Infer(args) => infer::cmd_infer(args),
        Command::Schema(schema_cmd) => match schema_cmd.action {
            SchemaAction::Show => schema::cmd_schema_show(),
            SchemaAction::Validate(args) => schema::cmd_schema_validate(args),
        },
        Command::Status(args) => status::cmd_status(args),
        Command::Scope(scope_cmd) => match scope_cmd.action {
            ScopeAction::Show => scope::cmd_scope_show(),
            ScopeAction::Set(args) => scope::cmd_scope_set(args),
            ScopeAction::Add(args) => scope::cmd_scope_add(args),
            ScopeAction::Remove(args) => scope::cmd_scope_remove(args),
            ScopeAction::Clear => scope::cmd_scope_clear(),
        },
        Command::Gate(gate_cmd) => match gate_cmd.action {
            GateAction::Start(args) => gate::cmd_gate_start(args),
            GateAction::Edit(args) => gate::cmd_gate_edit(args),
            GateAction::Complete(args) => gate::cmd_gate_complete(args),
        },
        Command::SetStatus(args) => set_status::cmd_set_status(args),
        Command::Rework(args) => set_status::cmd_rework(args),
        Command::Hook => hook::cmd_hook(),
    }
}

/// Config, schema, checklist text, and parsed tasks of one project.
pub(crate) struct LoadedProject {
    pub ctx: ProjectContext,
    pub config: Config,
    pub schema: CompiledSchema,
    pub text: String,
    pub tasks: Vec<Task>,
}

impl LoadedProject {
    /// Load for a command that edits the checklist.
    ///
    /// Unlike the gating path, an invalid configured schema is an error
    /// here: writing through a fallback schema could corrupt the file.
    pub(crate) fn for_edit(ctx: ProjectContext) -> Result<Self> {
        let config = ctx.load_config()?;
        let schema = match config.schema()? {
            Some(schema) => schema.compile()?,
            None => crate::schema::builtin(),
        };
        let text = ctx.read_task_file(&config)?;
        let tasks = parser::parse(&text, &schema);
        Ok(Self {
            ctx,
            config,
            schema,
            text,
            tasks,
        })
    }

    pub(crate) fn task(&self, id: &str) -> Result<&Task> {
        find_by_id(id, &self.tasks).ok_or_else(|| {
            TaskgateError::UserError(format!(
                "task '{}' not found in {}.\n\nUse `taskgate status` to list tasks.",
                id.trim(),
                self.config.task_file
            ))
        })
    }

    /// Atomically replace the checklist with `text`.
    pub(crate) fn write_task_file(&self, text: &str) -> Result<()> {
        crate::fs::atomic_write_file(self.ctx.task_file_path(&self.config), text)
    }
}

/// Turn a gate decision into command output.
///
/// Blocks become `TaskgateError::Blocked` so `main` exits with the blocked
/// code and prints the directive to stderr.
pub(crate) fn report_decision(decision: GateDecision) -> Result<()> {
    match decision {
        GateDecision::Allow => {
            println!("allow");
            Ok(())
        }
        GateDecision::Block(reason) => Err(TaskgateError::Blocked(format!(
            "blocked by the {} gate\n{}",
            reason.gate, reason.directive
        ))),
    }
}
