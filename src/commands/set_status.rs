//! Implementation of the `taskgate set-status` and `taskgate rework` commands.

use super::LoadedProject;
use crate::cli::{ReworkArgs, SetStatusArgs};
use crate::context::require_initialized_project;
use crate::error::Result;
use crate::schema::FieldKey;
use crate::status::State;
use crate::writeback;

/// Execute the `taskgate set-status` command.
///
/// The checkbox is checked for every state except the field's weakest one,
/// unless `--uncheck` is given.
pub fn cmd_set_status(args: SetStatusArgs) -> Result<()> {
    let ctx = require_initialized_project()?;
    let project = LoadedProject::for_edit(ctx)?;

    let field = FieldKey::from(args.field.trim().to_lowercase());
    let state: State = args.state.parse()?;
    let task = project.task(&args.task_id)?;
    let checked = !args.uncheck && !state.is_weakest();

    let updated = writeback::record_state(
        &project.text,
        task,
        &field,
        state,
        args.reason.as_deref(),
        Some(checked),
        &project.schema,
    )?;
    project.write_task_file(&updated)?;

    println!("{} {}: {}", task.id, field, state);
    Ok(())
}

/// Execute the `taskgate rework` command.
pub fn cmd_rework(args: ReworkArgs) -> Result<()> {
    let ctx = require_initialized_project()?;
    let project = LoadedProject::for_edit(ctx)?;
    let gates = &project.config.gates;
    let task = project.task(&args.task_id)?;

    let updated = writeback::reset_for_rework(&project.text, task, gates, &project.schema)?;
    project.write_task_file(&updated)?;

    println!(
        "{} reset for rework: {} -> {}, {} -> {}",
        task.id,
        gates.verification_field,
        State::NotVerified,
        gates.dev_field,
        State::InProgress
    );
    Ok(())
}
