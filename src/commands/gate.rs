//! Implementation of the `taskgate gate` subcommands.
//!
//! Command-line access to the three gates, for scripts and for hosts that
//! call a command per check instead of `taskgate hook`.

use super::report_decision;
use crate::cli::{GateCompleteArgs, GateEditArgs, GateStartArgs};
use crate::context::resolve_context;
use crate::error::{Result, TaskgateError};
use crate::gate::{self, Target};
use crate::hook::load_tasks;
use crate::scope_record::ActiveScope;
use std::io::Read;

/// Execute `taskgate gate start`.
pub fn cmd_gate_start(args: GateStartArgs) -> Result<()> {
    let ctx = resolve_context()?;
    let config = ctx.load_config()?;
    let (tasks, _) = load_tasks(&ctx, &config)?;

    let target = match (args.task.as_deref(), args.prompt.as_deref()) {
        (Some(id), _) => Target::Id(id),
        (None, Some(prompt)) => Target::Prompt(prompt),
        (None, None) => Target::Unspecified,
    };
    report_decision(gate::check_prework_request(target, &tasks, &config.gates))
}

/// Execute `taskgate gate edit`.
pub fn cmd_gate_edit(args: GateEditArgs) -> Result<()> {
    let ctx = resolve_context()?;
    let config = ctx.load_config()?;
    let scope = ActiveScope::load(ctx.scope_path())?;
    report_decision(gate::check_edit(
        &ctx.relative_path(&args.path),
        &scope,
        &config,
    ))
}

/// Execute `taskgate gate complete`.
pub fn cmd_gate_complete(args: GateCompleteArgs) -> Result<()> {
    let ctx = resolve_context()?;
    let config = ctx.load_config()?;

    let report = match &args.report {
        Some(path) => std::fs::read_to_string(path).map_err(|e| TaskgateError::io(path, e))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer).map_err(|e| {
                TaskgateError::UserError(format!("failed to read report from stdin: {}", e))
            })?;
            buffer
        }
    };

    let scope = ActiveScope::load(ctx.scope_path())?;
    let (tasks, schema) = load_tasks(&ctx, &config)?;
    report_decision(gate::check_completion(
        &report,
        &scope,
        &tasks,
        &schema,
        &config.gates,
    ))
}
