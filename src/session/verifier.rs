//! # Account Verification
//!
//! [`AccountVerifier`] runs the full check for one account: for each proxy of
//! a freshly shuffled order it connects the existing session, migrates it to
//! a new session and asks SpamBot about the account through the new one.
//!
//! ## Failover policy
//!
//! - Network errors (connect failure, transport RPC error, flood wait) move
//!   on to the next proxy.
//! - An unauthorized old session or a new session that does not resolve to
//!   the account stops immediately with [`Verdict::AccountInvalid`].
//! - Any other error, login flow errors included, stops with
//!   [`Verdict::Failed`].
//! - Running out of proxies gives [`Verdict::Unreachable`].
//!
//! Both sessions opened for an attempt are disconnected before the next
//! proxy is tried or a verdict is returned.
//!
//! ## Examples
//!
//! ```rust,ignore
//! use std::path::Path;
//! use tg_spamcheck::{AccountVerifier, ProxyPool, Settings};
//!
//! # async fn example(factory: impl tg_spamcheck::SessionFactory) -> anyhow::Result<()> {
//! let settings = Settings::default();
//! let pool = ProxyPool::load(&settings.paths.proxies_file)?;
//! let verifier = AccountVerifier::new(factory, pool, &settings);
//!
//! let clean = verifier
//!     .verify(Path::new("acc.session"), Path::new("acc.json"))
//!     .await;
//! # Ok(())
//! # }
//! ```

use crate::{
    Error, ErrorClass, Result,
    config::Settings,
    credentials,
    proxy::{ProxyPool, ProxyShuffler},
    session::{
        client::{SessionFactory, SessionSpec, TelegramSession},
        migrator::SessionMigrator,
        prober::SpamProber,
    },
    types::{AccountProfile, ProxyDescriptor, Verdict},
};
use std::path::Path;

/// Checks accounts one at a time over a shared proxy pool
pub struct AccountVerifier<F: SessionFactory> {
    /// Creates old and new sessions
    factory: F,
    /// Relays, read-only after construction
    pool: ProxyPool,
    /// Per-account proxy ordering
    shuffler: ProxyShuffler,
    migrator: SessionMigrator,
    prober: SpamProber,
}

impl<F: SessionFactory> AccountVerifier<F> {
    /// Creates a verifier using the timeouts, phrases and paths in `settings`.
    ///
    /// # Arguments
    ///
    /// * `factory` - Transport used to open sessions
    /// * `pool` - Proxies to rotate through
    /// * `settings` - Runtime configuration
    pub fn new(factory: F, pool: ProxyPool, settings: &Settings) -> Self {
        Self {
            factory,
            pool,
            shuffler: ProxyShuffler::new(settings.proxy.shuffle_seed),
            migrator: SessionMigrator::new(settings),
            prober: SpamProber::new(&settings.probe),
        }
    }

    /// Replace the session migrator
    pub fn with_migrator(mut self, migrator: SessionMigrator) -> Self {
        self.migrator = migrator;
        self
    }

    /// Replace the spam prober
    pub fn with_prober(mut self, prober: SpamProber) -> Self {
        self.prober = prober;
        self
    }

    /// Whether the account is confirmed free of spam restrictions.
    ///
    /// Restricted, invalid, unreachable and failed accounts all report
    /// `false`; use [`verify_detailed`](Self::verify_detailed) to tell them
    /// apart.
    pub async fn verify(&self, session: &Path, credentials: &Path) -> bool {
        self.verify_detailed(session, credentials).await.is_clean()
    }

    /// Check one account and classify the outcome.
    ///
    /// # Arguments
    ///
    /// * `session` - Existing authorized session file
    /// * `credentials` - JSON credential file belonging to the session
    pub async fn verify_detailed(&self, session: &Path, credentials: &Path) -> Verdict {
        let name = account_name(session);

        let profile = match credentials::load(credentials) {
            Ok(profile) => profile,
            Err(err) => {
                tracing::error!(account = %name, "Cannot load credentials: {}", err);
                return Verdict::Failed;
            }
        };

        let order = self.shuffler.order(&self.pool);
        if order.is_empty() {
            tracing::error!(account = %name, "Proxy pool is empty");
            return Verdict::Unreachable;
        }

        let mut last_error: Option<Error> = None;
        for (idx, proxy) in order.iter().enumerate() {
            tracing::info!(
                account = %name,
                attempt = idx + 1,
                total = order.len(),
                proxy = %proxy,
                "Checking account"
            );

            match self.attempt(session, &profile, &name, proxy).await {
                Ok(verdict) => {
                    tracing::info!(account = %name, %verdict, "Account checked");
                    return verdict;
                }
                Err(err) => match err.class() {
                    ErrorClass::Network => {
                        tracing::warn!(account = %name, proxy = %proxy, "Proxy attempt failed: {}", err);
                        last_error = Some(err);
                    }
                    ErrorClass::AccountState => {
                        tracing::warn!(account = %name, "Account is not usable: {}", err);
                        return Verdict::AccountInvalid;
                    }
                    _ => {
                        tracing::error!(account = %name, "Verification aborted: {}", err);
                        return Verdict::Failed;
                    }
                },
            }
        }

        tracing::error!(account = %name, "All proxies failed");
        if let Some(err) = last_error {
            tracing::error!(account = %name, "Last error: {}", err);
        }
        Verdict::Unreachable
    }

    /// One proxy attempt; the old session is disconnected whatever happens
    async fn attempt(
        &self,
        session: &Path,
        profile: &AccountProfile,
        name: &str,
        proxy: &ProxyDescriptor,
    ) -> Result<Verdict> {
        let old = self
            .factory
            .open(SessionSpec::existing(session, profile, proxy))?;
        let outcome = self.attempt_with_old(&old, profile, name, proxy).await;
        old.disconnect().await;
        outcome
    }

    async fn attempt_with_old(
        &self,
        old: &F::Session,
        profile: &AccountProfile,
        name: &str,
        proxy: &ProxyDescriptor,
    ) -> Result<Verdict> {
        old.connect().await?;
        if !old.is_authorized().await? {
            return Err(Error::Unauthorized);
        }

        let me = old.get_self().await?;
        tracing::info!(
            account = %name,
            user_id = me.id,
            first_name = me.first_name.as_deref().unwrap_or(""),
            "Old session authorized"
        );

        let new = self
            .migrator
            .migrate(&self.factory, old, profile, name, proxy)
            .await?;
        let outcome = self.check_new(&new, me.id).await;
        new.disconnect().await;
        outcome
    }

    async fn check_new(&self, new: &F::Session, expected_id: i64) -> Result<Verdict> {
        let me = new.get_self().await?;
        if !me.is_self || me.id != expected_id {
            return Err(Error::inconsistent_identity(format!(
                "expected user {}, new session resolved to {} (is_self: {})",
                expected_id, me.id, me.is_self
            )));
        }

        Ok(if self.prober.probe(new).await {
            Verdict::Clean
        } else {
            Verdict::Restricted
        })
    }
}

/// Account name used in logs and reports: the session file stem
pub fn account_name(session: &Path) -> String {
    session
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| session.display().to_string())
}
