//! Credential loading
//!
//! Turns the JSON file shipped next to every session into an
//! [`AccountProfile`](crate::types::AccountProfile).

pub mod loader;

pub use loader::{load, parse};
