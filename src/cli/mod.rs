//! CLI argument parsing for taskgate.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Taskgate: schema-driven checklist parser and workflow gates.
///
/// Reads a project's checklist-style task file through a parsing schema and
/// enforces three workflow rules for agentic pipelines:
/// - one task in flight at a time, verified before the next starts
/// - source edits require a declared active scope
/// - a verifier's verdict must be recorded before it finishes
#[derive(Parser, Debug)]
#[command(name = "taskgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for taskgate.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize taskgate in the current directory.
    ///
    /// Creates `.taskgate/` and a config. When the checklist already exists,
    /// a schema is inferred from it and stored in the config.
    Init(InitArgs),

    /// Infer a parsing schema from a sample checklist file.
    ///
    /// Prints the inferred schema as YAML, with confidence and match rate.
    Infer(InferArgs),

    /// Inspect or re-validate the configured schema.
    Schema(SchemaCommand),

    /// Show every task with its field states.
    Status(StatusArgs),

    /// Manage the active-scope record.
    Scope(ScopeCommand),

    /// Evaluate a gate from the command line.
    ///
    /// Exits 0 when allowed and 2 when blocked, printing the directive.
    Gate(GateCommand),

    /// Record a state for one field of one task in the checklist.
    #[command(name = "set-status")]
    SetStatus(SetStatusArgs),

    /// Reset a task whose verification failed so it can be reworked.
    Rework(ReworkArgs),

    /// Handle one host event read as JSON from stdin.
    ///
    /// Writes a JSON decision to stdout; exits 2 when blocked.
    Hook,
}

/// Arguments for the `init` command.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Checklist file path, relative to the project root.
    #[arg(long, default_value = "tasks.md")]
    pub task_file: String,

    /// Overwrite an existing config.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `infer` command.
#[derive(Parser, Debug)]
pub struct InferArgs {
    /// Sample checklist file to infer from.
    pub file: PathBuf,

    /// Store the inferred schema in the project config.
    #[arg(long)]
    pub write: bool,
}

/// Schema subcommands.
#[derive(Parser, Debug)]
pub struct SchemaCommand {
    #[command(subcommand)]
    pub action: SchemaAction,
}

/// Available schema actions.
#[derive(Subcommand, Debug)]
pub enum SchemaAction {
    /// Print the effective schema as YAML.
    Show,

    /// Validate the configured schema and re-check it against the checklist.
    ///
    /// Refreshes confidence, match rate, and the validation timestamp.
    Validate(SchemaValidateArgs),
}

/// Arguments for the `schema validate` command.
#[derive(Parser, Debug)]
pub struct SchemaValidateArgs {
    /// Persist the refreshed confidence and match rate.
    #[arg(long)]
    pub write: bool,
}

/// Arguments for the `status` command.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Print tasks as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Scope subcommands.
#[derive(Parser, Debug)]
pub struct ScopeCommand {
    #[command(subcommand)]
    pub action: ScopeAction,
}

/// Available scope actions.
#[derive(Subcommand, Debug)]
pub enum ScopeAction {
    /// Print the active scope.
    Show,

    /// Replace the active scope with the given task ids.
    Set(ScopeIdsArgs),

    /// Add task ids to the active scope.
    Add(ScopeIdsArgs),

    /// Remove task ids from the active scope.
    Remove(ScopeIdsArgs),

    /// Clear the active scope.
    Clear,
}

/// Task ids for scope changes.
#[derive(Parser, Debug)]
pub struct ScopeIdsArgs {
    /// Task IDs (e.g., T001 T002).
    #[arg(required = true, value_delimiter = ',')]
    pub ids: Vec<String>,

    /// Role tag recorded as the declarer.
    #[arg(long)]
    pub actor: Option<String>,
}

/// Gate subcommands.
#[derive(Parser, Debug)]
pub struct GateCommand {
    #[command(subcommand)]
    pub action: GateAction,
}

/// Available gate checks.
#[derive(Subcommand, Debug)]
pub enum GateAction {
    /// Pre-work gate: may work start on this task?
    Start(GateStartArgs),

    /// Scope gate: may this path be edited?
    Edit(GateEditArgs),

    /// Completion gate: is the verdict in this report recorded?
    Complete(GateCompleteArgs),
}

/// Arguments for the `gate start` command.
#[derive(Parser, Debug)]
pub struct GateStartArgs {
    /// Explicit task id (exact match).
    #[arg(long, conflicts_with = "prompt")]
    pub task: Option<String>,

    /// Free text resolved to a task by id mention or keywords.
    #[arg(long)]
    pub prompt: Option<String>,
}

/// Arguments for the `gate edit` command.
#[derive(Parser, Debug)]
pub struct GateEditArgs {
    /// Path about to be edited.
    pub path: String,
}

/// Arguments for the `gate complete` command.
#[derive(Parser, Debug)]
pub struct GateCompleteArgs {
    /// Verification report file; stdin when omitted.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Arguments for the `set-status` command.
#[derive(Parser, Debug)]
pub struct SetStatusArgs {
    /// Task ID (e.g., T001).
    pub task_id: String,

    /// Semantic field key (dev, qa, user_verification, ...).
    pub field: String,

    /// Semantic state (not_started, in_progress, complete, not_verified,
    /// verified_success, verified_failure).
    pub state: String,

    /// Failure reason (verified_failure only).
    #[arg(long)]
    pub reason: Option<String>,

    /// Leave the status checkbox unchecked.
    #[arg(long)]
    pub uncheck: bool,
}

/// Arguments for the `rework` command.
#[derive(Parser, Debug)]
pub struct ReworkArgs {
    /// Task ID whose failed verification should be reset.
    pub task_id: String,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
