//! Session handling and the verification pipeline
//!
//! This module holds the Telegram session capability traits, the login-code
//! relay that migrates an account to a fresh session, the SpamBot prober and
//! the verifier tying them together with proxy failover.

pub mod client;
pub mod migrator;
pub mod prober;
#[cfg(test)]
pub(crate) mod testing;
pub mod verifier;

pub use client::{
    ListenerGuard, ListenerId, Notification, NotificationSink, SelfIdentity, SessionFactory,
    SessionSpec, SignInOutcome, TelegramSession,
};
pub use migrator::{SessionMigrator, extract_login_code};
pub use prober::SpamProber;
pub use verifier::{AccountVerifier, account_name};
