//! Batch driver
//!
//! Finds session/credential pairs under a directory and verifies them one
//! after another. A failing account is recorded and the batch carries on.

use crate::{
    Error, Result,
    session::{AccountVerifier, SessionFactory, account_name},
    types::{AccountResult, BatchReport},
};
use std::path::{Path, PathBuf};

/// A session file and the credential file next to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPair {
    pub session: PathBuf,
    pub credentials: PathBuf,
}

impl AccountPair {
    pub fn name(&self) -> String {
        account_name(&self.session)
    }
}

/// Collect every `<stem>.session` under `dir` that has a `<stem>.json`
/// beside it, sorted by path. Symlinked directories are not followed and
/// unreadable subdirectories are skipped.
pub fn discover_accounts(dir: &Path) -> Result<Vec<AccountPair>> {
    if !dir.is_dir() {
        return Err(Error::config(format!("{:?} is not a directory", dir)));
    }

    let mut pairs = Vec::new();
    collect(dir, &mut pairs)?;
    pairs.sort_by(|a, b| a.session.cmp(&b.session));

    if pairs.is_empty() {
        return Err(Error::config("no accounts found"));
    }
    tracing::info!("Found {} accounts under {:?}", pairs.len(), dir);
    Ok(pairs)
}

fn collect(dir: &Path, pairs: &mut Vec<AccountPair>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_symlink() && path.is_dir() {
            tracing::debug!("Not following symlinked directory {:?}", path);
            continue;
        }
        if file_type.is_dir() {
            if let Err(err) = collect(&path, pairs) {
                tracing::warn!("Skipping unreadable directory {:?}: {}", path, err);
            }
            continue;
        }
        if path.extension().is_none_or(|ext| ext != "session") {
            continue;
        }

        let credentials = path.with_extension("json");
        if credentials.is_file() {
            pairs.push(AccountPair {
                session: path,
                credentials,
            });
        } else {
            tracing::warn!("Skipping {:?}: no credential file beside it", path);
        }
    }
    Ok(())
}

/// Verify every pair in order and summarise the outcome
pub async fn run_batch<F: SessionFactory>(
    verifier: &AccountVerifier<F>,
    pairs: &[AccountPair],
) -> BatchReport {
    let mut results = Vec::with_capacity(pairs.len());

    for (idx, pair) in pairs.iter().enumerate() {
        let name = pair.name();
        tracing::info!("[{}/{}] Verifying {}", idx + 1, pairs.len(), name);
        let verdict = verifier
            .verify_detailed(&pair.session, &pair.credentials)
            .await;
        results.push(AccountResult { name, verdict });
    }

    let report = BatchReport::from_results(results);
    tracing::info!(
        "Batch finished: {} good, {} bad",
        report.good.len(),
        report.bad.len()
    );
    report
}
