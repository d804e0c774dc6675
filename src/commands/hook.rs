//! Implementation of the `taskgate hook` command.

use crate::context::resolve_context;
use crate::error::{Result, TaskgateError};
use crate::hook::{self, HookEvent, HookResponse};
use std::io::Read;

/// Execute the `taskgate hook` command.
///
/// Reads one event from stdin and writes the JSON response to stdout. A
/// block is also returned as `TaskgateError::Blocked` so the process exits
/// with the blocked code and the directive reaches stderr.
pub fn cmd_hook() -> Result<()> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| TaskgateError::UserError(format!("failed to read hook event: {}", e)))?;
    let event = HookEvent::from_json(&input)?;

    let ctx = resolve_context()?;
    let decision = hook::handle(&event, &ctx)?;
    tracing::debug!(event = ?event.event, allowed = decision.is_allowed(), "hook decision");

    let response = HookResponse::from(decision);
    let json = serde_json::to_string(&response)
        .map_err(|e| TaskgateError::UserError(format!("failed to serialize response: {}", e)))?;
    println!("{}", json);

    match response.reason {
        Some(reason) if response.block.is_some() => Err(TaskgateError::Blocked(reason)),
        _ => Ok(()),
    }
}
