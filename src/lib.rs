//! Telegram account spam-restriction checker
//!
//! Bulk-verifies Telegram accounts, each given as an authenticated session
//! file plus a JSON credential file, for anti-spam restrictions.
//!
//! # Architecture
//!
//! For every account the verifier walks a freshly shuffled proxy list:
//! - **Connect** the existing session through the proxy and confirm it is
//!   still logged in
//! - **Migrate** the account to a new session by relaying the login code
//!   Telegram sends to the old one
//! - **Probe** SpamBot from the new session and classify its reply
//!
//! Network failures move on to the next proxy; everything else ends the
//! account's check. Telegram itself is reached through the
//! [`TelegramSession`] / [`SessionFactory`] traits; the real transport lives
//! behind the `mtproto` feature.
//!
//! # Usage
//!
//! ```bash
//! tg-spamcheck --accounts ./accounts --proxies proxies.txt
//! ```
//!
//! # Examples
//!
//! ```rust
//! use tg_spamcheck::{ProxyPool, Settings};
//!
//! let settings = Settings::default();
//! let pool = ProxyPool::parse("10.0.0.1:1080:user:pass\n")?;
//! assert_eq!(pool.len(), 1);
//! assert_eq!(settings.probe.bot_username, "SpamBot");
//! # Ok::<(), tg_spamcheck::Error>(())
//! ```

pub mod batch;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod proxy;
pub mod session;
pub mod transport;
pub mod types;

pub use config::Settings;
pub use error::{Error, ErrorClass, Result};
pub use proxy::{ProxyPool, ProxyShuffler};
pub use session::{AccountVerifier, SessionFactory, TelegramSession};
pub use types::{AccountProfile, BatchReport, ProxyDescriptor, Verdict};
