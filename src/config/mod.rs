//! Configuration management for the checker
//!
//! This module handles loading and managing configuration settings
//! for the verifier and the command-line driver.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{
    LoggingSettings, MigrationSettings, PathSettings, ProbeSettings, ProxySettings,
    SERVICE_NOTIFICATIONS_ID, Settings,
};
