//! Implementation of the `taskgate status` command.
//!
//! Lists every task with the state of each tracked field, then the active
//! scope.

use crate::cli::StatusArgs;
use crate::context::require_initialized_project;
use crate::error::{Result, TaskgateError};
use crate::hook::load_tasks;
use crate::parser::Task;
use crate::scope_record::ActiveScope;
use crate::status::State;

/// Execute the `taskgate status` command.
pub fn cmd_status(args: StatusArgs) -> Result<()> {
    let ctx = require_initialized_project()?;
    let config = ctx.load_config()?;
    let (tasks, _) = load_tasks(&ctx, &config)?;
    let scope = ActiveScope::load(ctx.scope_path())?;

    if args.json {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "task_file": config.task_file,
            "tasks": tasks,
            "active_scope": scope,
        }))
        .map_err(|e| TaskgateError::UserError(format!("failed to serialize status: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    println!("Checklist: {} ({} tasks)", config.task_file, tasks.len());
    println!();
    for task in &tasks {
        println!("{}", render_task(task, &scope));
    }
    if !tasks.is_empty() {
        println!();
    }

    if scope.is_empty() {
        println!("Active scope: (none)");
    } else {
        println!("Active scope: {}", scope.task_ids.join(", "));
    }

    Ok(())
}

fn render_task(task: &Task, scope: &ActiveScope) -> String {
    let marker = if scope.contains(&task.id) { "*" } else { " " };
    let mut line = format!("{} {:<10} L{:<5} {}", marker, task.id, task.line, task.description);
    for (key, field) in &task.fields {
        let state = match (field.state, field.reason.as_deref()) {
            (State::VerifiedFailure, Some(reason)) => format!("{} ({})", field.state, reason),
            (state, _) if field.raw.is_none() => format!("{} (no line)", state),
            (state, _) => state.to_string(),
        };
        let check = if field.checked { "x" } else { " " };
        line.push_str(&format!("\n      [{}] {}: {}", check, key, state));
    }
    line
}
