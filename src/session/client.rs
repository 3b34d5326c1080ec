//! Telegram session capability interface
//!
//! The verifier never talks to a concrete MTProto client. It drives sessions
//! through [`TelegramSession`] and creates them through [`SessionFactory`],
//! which keeps the orchestration testable without network access.

use crate::{
    Result,
    types::{AccountProfile, DeviceInfo, ProxyDescriptor},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// The account a session is logged into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfIdentity {
    /// Telegram user id
    pub id: i64,
    /// First name, if set
    pub first_name: Option<String>,
    /// Telegram's own "this user is you" flag
    pub is_self: bool,
}

/// An incoming message delivered to a notification listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Sender user id (777000 for service notifications)
    pub sender_id: i64,
    /// Message text
    pub text: String,
}

/// Result of submitting a login code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInOutcome {
    /// The session is now logged in
    SignedIn,
    /// Two-step verification is enabled; a password must follow
    PasswordRequired,
}

/// Handle identifying a registered notification listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Channel end a session pushes notifications into
pub type NotificationSink = mpsc::UnboundedSender<Notification>;

/// One Telegram session bound to one proxy.
///
/// Methods returning errors must use the network variants of
/// [`crate::Error`] (`Connection`, `Rpc`, `FloodWait`) for transport trouble
/// and [`crate::Error::SignInRejected`] when Telegram refuses a code or
/// password, so the verifier can pick the right failover policy.
#[async_trait]
pub trait TelegramSession: Send + Sync {
    /// Open the connection
    async fn connect(&self) -> Result<()>;

    /// Whether the stored session is logged in
    async fn is_authorized(&self) -> Result<bool>;

    /// Resolve the logged-in account
    async fn get_self(&self) -> Result<SelfIdentity>;

    /// Ask Telegram to send a login code for `phone`
    async fn request_code(&self, phone: &str) -> Result<()>;

    /// Submit the login code received for the last [`request_code`](Self::request_code)
    async fn sign_in(&self, phone: &str, code: &str) -> Result<SignInOutcome>;

    /// Submit the two-step verification password
    async fn sign_in_with_password(&self, password: &str) -> Result<()>;

    /// Start forwarding incoming messages to `sink`
    fn add_notification_listener(&self, sink: NotificationSink) -> ListenerId;

    /// Stop forwarding to the listener registered under `id`
    fn remove_notification_listener(&self, id: ListenerId);

    /// Send `message` to `peer` (a username) and return the next reply text
    async fn converse(&self, peer: &str, message: &str) -> Result<String>;

    /// Close the connection. Safe to call on a session that never connected.
    async fn disconnect(&self);
}

/// Parameters for opening a session
#[derive(Debug, Clone)]
pub struct SessionSpec {
    /// Session file location
    pub path: PathBuf,
    pub api_id: i32,
    pub api_hash: String,
    /// Device fingerprint; empty for the existing session
    pub device: DeviceInfo,
    /// Relay all traffic through this proxy
    pub proxy: ProxyDescriptor,
}

impl SessionSpec {
    /// Spec for an existing session: API credentials and proxy only
    pub fn existing(path: &Path, profile: &AccountProfile, proxy: &ProxyDescriptor) -> Self {
        Self {
            path: path.to_path_buf(),
            api_id: profile.api_id,
            api_hash: profile.api_hash.clone(),
            device: DeviceInfo::default(),
            proxy: proxy.clone(),
        }
    }

    /// Spec for a fresh session presenting the profile's device fingerprint
    pub fn fresh(path: PathBuf, profile: &AccountProfile, proxy: &ProxyDescriptor) -> Self {
        Self {
            path,
            api_id: profile.api_id,
            api_hash: profile.api_hash.clone(),
            device: profile.device.clone(),
            proxy: proxy.clone(),
        }
    }
}

/// Creates session handles. Opening does no I/O; call
/// [`TelegramSession::connect`] afterwards.
pub trait SessionFactory: Send + Sync {
    type Session: TelegramSession;

    fn open(&self, spec: SessionSpec) -> Result<Self::Session>;
}

/// Registered notification listener, removed again when dropped
pub struct ListenerGuard<'a, S: TelegramSession + ?Sized> {
    session: &'a S,
    id: ListenerId,
}

impl<'a, S: TelegramSession + ?Sized> ListenerGuard<'a, S> {
    /// Register `sink` on `session`
    pub fn register(session: &'a S, sink: NotificationSink) -> Self {
        let id = session.add_notification_listener(sink);
        tracing::debug!("Registered notification listener {:?}", id);
        Self { session, id }
    }
}

impl<S: TelegramSession + ?Sized> Drop for ListenerGuard<'_, S> {
    fn drop(&mut self) {
        self.session.remove_notification_listener(self.id);
        tracing::debug!("Removed notification listener {:?}", self.id);
    }
}
