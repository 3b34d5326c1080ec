//! Error handling for the checker
//!
//! This module defines error types and the classification used to decide
//! whether a failed attempt should move on to the next proxy.

pub mod types;

pub use types::{Error, ErrorClass, Result};
