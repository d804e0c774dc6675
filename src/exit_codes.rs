//! Exit code constants for the taskgate CLI.
//!
//! - 0: Success (or gate allowed)
//! - 1: User error (bad args, unreadable files, invalid state)
//! - 2: Gate blocked the requested action
//! - 3: Schema validation failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, missing files, or invalid state.
pub const USER_ERROR: i32 = 1;

/// A gate blocked the action. Hosts treat this code as "do not proceed"
/// and feed stderr back to the acting agent.
pub const BLOCKED: i32 = 2;

/// The configured schema is malformed or unsupported.
pub const SCHEMA_INVALID: i32 = 3;
