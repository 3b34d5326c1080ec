//! Proxy pool management
//!
//! Loads the relay list and hands every account its own shuffled attempt
//! order.

pub mod pool;

pub use pool::{ProxyPool, ProxyShuffler, parse_line};
