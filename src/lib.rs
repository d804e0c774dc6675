//! Taskgate: schema-driven checklist parsing and workflow gates for agentic
//! coding pipelines.
//!
//! A project keeps its tasks in a human-edited checklist. Taskgate parses it
//! through a configurable (or inferred) schema, normalizes every status value
//! to a fixed state vocabulary, and enforces three gates on top: one task in
//! flight at a time, no source edits without a declared scope, and no
//! finishing a verification without recording its verdict.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod gate;
pub mod hook;
pub mod infer;
pub mod logging;
pub mod matcher;
pub mod parser;
pub mod schema;
pub mod scope_record;
pub mod status;
pub mod writeback;

#[cfg(test)]
mod test_support;
