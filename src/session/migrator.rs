//! Session migration via login-code relay
//!
//! A fresh session is created for the account and logged in with a code that
//! Telegram delivers to the existing, already authorized session. The old
//! session only ever listens; the new one requests and submits the code.

use crate::{
    Error, Result,
    config::Settings,
    session::client::{ListenerGuard, SessionFactory, SessionSpec, SignInOutcome, TelegramSession},
    types::{AccountProfile, ProxyDescriptor},
};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::sync::mpsc;

static LOGIN_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{5,6}\b").expect("login code pattern is valid"));

/// First standalone 5-6 digit token in a service message
pub fn extract_login_code(text: &str) -> Option<&str> {
    LOGIN_CODE.find(text).map(|m| m.as_str())
}

/// Creates and authenticates a new session from an authorized one
#[derive(Debug, Clone)]
pub struct SessionMigrator {
    new_session_dir: PathBuf,
    new_session_suffix: String,
    service_sender_id: i64,
    code_timeout: Duration,
}

impl SessionMigrator {
    pub fn new(settings: &Settings) -> Self {
        Self {
            new_session_dir: settings.paths.new_session_dir.clone(),
            new_session_suffix: settings.migration.new_session_suffix.clone(),
            service_sender_id: settings.migration.service_sender_id,
            code_timeout: settings.migration.code_timeout(),
        }
    }

    /// Override the login code wait
    pub fn with_code_timeout(mut self, timeout: Duration) -> Self {
        self.code_timeout = timeout;
        self
    }

    /// Where the new session for account `name` is stored.
    ///
    /// The phone digits keep same-named accounts from different folders
    /// apart.
    pub fn new_session_path(&self, name: &str, profile: &AccountProfile) -> PathBuf {
        let digits: String = profile.phone.chars().filter(char::is_ascii_digit).collect();
        self.new_session_dir.join(format!(
            "{}_{}{}.session",
            name, digits, self.new_session_suffix
        ))
    }

    /// Produce an authenticated new session for the account behind `old`.
    ///
    /// `old` must already be connected. The new session uses the same proxy
    /// and presents the profile's device fingerprint. On failure the new
    /// session has been disconnected before the error is returned.
    ///
    /// # Errors
    ///
    /// * [`Error::Unauthorized`] if `old` is not logged in
    /// * [`Error::CodeTimeout`] if no code arrives in time
    /// * [`Error::NoTwoFaConfigured`] if a password is required but the profile has none
    /// * [`Error::SignInRejected`] if Telegram refuses the code or password
    /// * network errors raised by the transport
    pub async fn migrate<F: SessionFactory>(
        &self,
        factory: &F,
        old: &F::Session,
        profile: &AccountProfile,
        name: &str,
        proxy: &ProxyDescriptor,
    ) -> Result<F::Session> {
        if !old.is_authorized().await? {
            return Err(Error::Unauthorized);
        }

        let path = self.new_session_path(name, profile);
        tracing::debug!("Opening new session at {:?}", path);
        let new = factory.open(SessionSpec::fresh(path, profile, proxy))?;

        match self.authorize(old, &new, profile).await {
            Ok(()) => {
                tracing::info!("Session for {} migrated", name);
                Ok(new)
            }
            Err(err) => {
                new.disconnect().await;
                Err(err)
            }
        }
    }

    async fn authorize<S: TelegramSession + ?Sized>(
        &self,
        old: &S,
        new: &S,
        profile: &AccountProfile,
    ) -> Result<()> {
        new.connect().await?;
        if new.is_authorized().await? {
            tracing::debug!("New session is already authorized, skipping code relay");
            return Ok(());
        }

        let phone = profile.dial_phone();
        let code = self.relay_code(old, new, &phone).await?;

        match new.sign_in(&phone, &code).await? {
            SignInOutcome::SignedIn => Ok(()),
            SignInOutcome::PasswordRequired => {
                let password = profile
                    .two_fa
                    .as_deref()
                    .filter(|p| !p.is_empty())
                    .ok_or(Error::NoTwoFaConfigured)?;
                tracing::debug!("Submitting two-factor password");
                new.sign_in_with_password(password).await
            }
        }
    }

    /// Request a code on `new` and catch it on `old`
    async fn relay_code<S: TelegramSession + ?Sized>(
        &self,
        old: &S,
        new: &S,
        phone: &str,
    ) -> Result<String> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _listener = ListenerGuard::register(old, tx);

        new.request_code(phone).await?;
        tracing::debug!("Login code requested, waiting up to {:?}", self.code_timeout);

        let sender = self.service_sender_id;
        let wait = async {
            while let Some(notification) = rx.recv().await {
                if notification.sender_id != sender {
                    continue;
                }
                match extract_login_code(&notification.text) {
                    Some(code) => return Ok(code.to_string()),
                    None => tracing::debug!("Service message without a login code"),
                }
            }
            Err(Error::connection("notification stream closed"))
        };

        tokio::time::timeout(self.code_timeout, wait)
            .await
            .map_err(|_| Error::CodeTimeout {
                seconds: self.code_timeout.as_secs(),
            })?
    }
}
