//! Error type definitions
//!
//! Defines the main error type used throughout the checker together with the
//! classification that drives proxy failover.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the checker
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors (settings, proxy list)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential or session file could not be read or is malformed
    #[error("Failed to parse {path:?}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// Transport could not reach Telegram (proxy refused, socket closed, ...)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Telegram answered an RPC call with an error
    #[error("RPC error {code}: {name}")]
    Rpc { code: i32, name: String },

    /// Telegram asked us to back off
    #[error("Flood wait of {seconds} seconds")]
    FloodWait { seconds: u64 },

    /// The supplied session is no longer logged in
    #[error("Session is not authorized")]
    Unauthorized,

    /// The migrated session does not resolve to the account itself
    #[error("New session identity is inconsistent: {0}")]
    InconsistentIdentity(String),

    /// No login code reached the old session in time
    #[error("No login code received within {seconds} seconds")]
    CodeTimeout { seconds: u64 },

    /// Account has two-step verification but the credential file has no password
    #[error("Two-factor password required but none configured")]
    NoTwoFaConfigured,

    /// Telegram refused the code or the password
    #[error("Sign-in rejected: {0}")]
    SignInRejected(String),

    /// Failure during the SpamBot conversation
    #[error("Probe error: {0}")]
    Probe(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error families used by the verifier's retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed input; never retried
    Config,
    /// Transport trouble; move on to the next proxy
    Network,
    /// The account itself is unusable; stop immediately
    AccountState,
    /// Login flow failed; stop the proxy loop
    AuthFlow,
    /// Spam probe failure; reported as restricted
    Probe,
    /// Anything else; stop the proxy loop
    Other,
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a credential parse error
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create an RPC error
    pub fn rpc(code: i32, name: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            name: name.into(),
        }
    }

    /// Create a flood-wait error
    pub fn flood_wait(seconds: u64) -> Self {
        Self::FloodWait { seconds }
    }

    /// Create an identity mismatch error
    pub fn inconsistent_identity(msg: impl Into<String>) -> Self {
        Self::InconsistentIdentity(msg.into())
    }

    /// Create a sign-in rejection
    pub fn sign_in_rejected(msg: impl Into<String>) -> Self {
        Self::SignInRejected(msg.into())
    }

    /// Create a probe error
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Classify this error for the failover policy
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Config(_) | Self::Parse { .. } | Self::Toml(_) => ErrorClass::Config,
            Self::Connection(_) | Self::Rpc { .. } | Self::FloodWait { .. } => ErrorClass::Network,
            Self::Unauthorized | Self::InconsistentIdentity(_) => ErrorClass::AccountState,
            Self::CodeTimeout { .. } | Self::NoTwoFaConfigured | Self::SignInRejected(_) => {
                ErrorClass::AuthFlow
            }
            Self::Probe(_) => ErrorClass::Probe,
            Self::Json(_) | Self::Io(_) | Self::Internal(_) => ErrorClass::Other,
        }
    }
}
