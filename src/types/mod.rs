//! Type definitions for the checker
//!
//! This module contains the main data structures shared by the loaders,
//! the verifier and the batch driver.

pub mod profile;
pub mod proxy;
pub mod report;
pub mod serde_helpers;

pub use profile::{AccountProfile, DeviceInfo};
pub use proxy::{ProxyDescriptor, ProxyProtocol};
pub use report::{AccountResult, BatchReport, Verdict};
