//! Verification outcome and batch report types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Detailed outcome of verifying one account.
///
/// Only [`Verdict::Clean`] counts as a good account; every other variant maps
/// to `false` in the boolean API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// SpamBot confirmed the account has no limits
    Clean,
    /// SpamBot reported limits, or could not confirm the opposite
    Restricted,
    /// The session is logged out or the new session is not the account itself
    AccountInvalid,
    /// Every proxy failed at the network level
    Unreachable,
    /// Credentials, login flow or an unexpected error stopped the check
    Failed,
}

impl Verdict {
    /// Boolean view: `true` only for a confirmed clean account
    pub fn is_clean(self) -> bool {
        self == Self::Clean
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Clean => "clean",
            Self::Restricted => "restricted",
            Self::AccountInvalid => "account_invalid",
            Self::Unreachable => "unreachable",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of one account within a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResult {
    /// Account name (session file stem)
    pub name: String,
    /// Detailed outcome
    pub verdict: Verdict,
}

/// Summary of a whole batch, printed by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// When the batch finished
    #[serde(rename = "checkedAt")]
    pub checked_at: DateTime<Utc>,

    /// Accounts confirmed clean
    pub good: Vec<String>,

    /// Everything else
    pub bad: Vec<String>,

    /// Per-account detail, in processing order
    pub accounts: Vec<AccountResult>,
}

impl BatchReport {
    /// Build a report from per-account results
    pub fn from_results(accounts: Vec<AccountResult>) -> Self {
        let (good, bad): (Vec<_>, Vec<_>) = accounts.iter().partition(|r| r.verdict.is_clean());
        Self {
            checked_at: Utc::now(),
            good: good.into_iter().map(|r| r.name.clone()).collect(),
            bad: bad.into_iter().map(|r| r.name.clone()).collect(),
            accounts,
        }
    }

    /// Total number of accounts checked
    pub fn total(&self) -> usize {
        self.accounts.len()
    }
}
