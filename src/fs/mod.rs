//! Filesystem utilities for taskgate.
//!
//! Every file taskgate writes back (checklist, config, active scope) goes
//! through an atomic write so a crash never leaves a partial file behind.

pub mod atomic;

pub use atomic::{atomic_write, atomic_write_file};
