//! Implementation of the `taskgate scope` subcommands.
//!
//! Scope changes name task ids explicitly. Ids are checked against the
//! checklist and stored in the checklist's own spelling.

use crate::cli::ScopeIdsArgs;
use crate::context::{ProjectContext, require_initialized_project};
use crate::error::{Result, TaskgateError};
use crate::hook::load_tasks;
use crate::matcher::find_by_id;
use crate::scope_record::ActiveScope;

/// Execute `taskgate scope show`.
pub fn cmd_scope_show() -> Result<()> {
    let ctx = require_initialized_project()?;
    let scope = ActiveScope::load(ctx.scope_path())?;
    print_scope(&scope);
    Ok(())
}

/// Execute `taskgate scope set`.
pub fn cmd_scope_set(args: ScopeIdsArgs) -> Result<()> {
    let ctx = require_initialized_project()?;
    let ids = resolve_ids(&ctx, &args.ids)?;
    let mut scope = ActiveScope::load(ctx.scope_path())?;
    scope.declare(&ids, args.actor.as_deref());
    scope.save(ctx.scope_path())?;
    print_scope(&scope);
    Ok(())
}

/// Execute `taskgate scope add`.
pub fn cmd_scope_add(args: ScopeIdsArgs) -> Result<()> {
    let ctx = require_initialized_project()?;
    let ids = resolve_ids(&ctx, &args.ids)?;
    let mut scope = ActiveScope::load(ctx.scope_path())?;
    let added = scope.add(&ids, args.actor.as_deref());
    scope.save(ctx.scope_path())?;
    println!("Added {} task(s).", added);
    print_scope(&scope);
    Ok(())
}

/// Execute `taskgate scope remove`.
///
/// Ids are not checked against the checklist so that stale entries can
/// always be removed.
pub fn cmd_scope_remove(args: ScopeIdsArgs) -> Result<()> {
    let ctx = require_initialized_project()?;
    let mut scope = ActiveScope::load(ctx.scope_path())?;
    let removed = scope.remove(&args.ids);
    scope.save(ctx.scope_path())?;
    println!("Removed {} task(s).", removed);
    print_scope(&scope);
    Ok(())
}

/// Execute `taskgate scope clear`.
pub fn cmd_scope_clear() -> Result<()> {
    let ctx = require_initialized_project()?;
    let mut scope = ActiveScope::load(ctx.scope_path())?;
    scope.clear();
    scope.save(ctx.scope_path())?;
    print_scope(&scope);
    Ok(())
}

fn resolve_ids(ctx: &ProjectContext, ids: &[String]) -> Result<Vec<String>> {
    let config = ctx.load_config()?;
    let (tasks, _) = load_tasks(ctx, &config)?;

    let mut resolved = Vec::new();
    let mut unknown = Vec::new();
    for id in ids {
        match find_by_id(id, &tasks) {
            Some(task) => resolved.push(task.id.clone()),
            None => unknown.push(id.trim().to_string()),
        }
    }

    if !unknown.is_empty() {
        return Err(TaskgateError::UserError(format!(
            "unknown task id(s): {}\n\nUse `taskgate status` to list tasks in {}.",
            unknown.join(", "),
            config.task_file
        )));
    }
    Ok(resolved)
}

fn print_scope(scope: &ActiveScope) {
    if scope.is_empty() {
        println!("Active scope: (none)");
        return;
    }
    println!("Active scope: {}", scope.task_ids.join(", "));
    if let Some(at) = scope.declared_at {
        let by = scope.declared_by.as_deref().unwrap_or("unknown");
        println!("Declared at {} by {}", at.to_rfc3339(), by);
    }
}
