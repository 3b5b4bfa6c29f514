//! spinning-wheel library crate.
//!
//! The primary interface is the `spinning-wheel` binary. This crate exposes
//! the parser, the model, and the merge engine so that integration tests and
//! benchmarks can drive merges without going through the CLI.

pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod python;
pub mod source;

// Private modules only used by the binary, not re-exported.
// batch, check, format, merge_cmd, telemetry
