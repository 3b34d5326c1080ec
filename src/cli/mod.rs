//! Command-line driver
//!
//! Argument handling lives in the binary; this module holds the logic it
//! runs.

pub mod check;

pub use check::{CheckArgs, init_logging, load_settings, run_check_mode};
