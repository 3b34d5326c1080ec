//! Batch check CLI logic
//!
//! Contains the core logic for checking a directory of accounts and
//! producing the JSON report.

use crate::{
    batch::{self, AccountPair},
    config::{ConfigLoader, Settings},
    proxy::ProxyPool,
    types::BatchReport,
};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Arguments for check mode
#[derive(Debug, Clone, Default)]
pub struct CheckArgs {
    /// Directory holding `<name>.session` + `<name>.json` pairs
    pub accounts: PathBuf,
    /// Proxy list, overriding the configured one
    pub proxies: Option<PathBuf>,
    /// TOML configuration file
    pub config: Option<PathBuf>,
    /// Directory for the migrated sessions, overriding the configured one
    pub session_dir: Option<PathBuf>,
    pub verbose: bool,
}

/// Resolve settings: config file, then environment, then CLI flags
pub fn load_settings(args: &CheckArgs) -> Result<Settings> {
    let config_file = args
        .config
        .clone()
        .or_else(|| ConfigLoader::default_config_path().filter(|p| p.exists()));

    let mut settings = ConfigLoader::new()
        .load(config_file.as_deref())
        .context("Failed to load configuration")?;

    if let Some(proxies) = &args.proxies {
        settings.paths.proxies_file = proxies.clone();
    }
    if let Some(dir) = &args.session_dir {
        settings.paths.new_session_dir = dir.clone();
    }
    if args.verbose {
        settings.logging.verbose = true;
    }
    Ok(settings)
}

/// Install the stderr log subscriber. `RUST_LOG` wins over the settings.
pub fn init_logging(settings: &Settings) {
    let level = if settings.logging.verbose {
        "debug".to_string()
    } else {
        settings.logging.level.to_ascii_lowercase()
    };

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Run check mode with the given arguments
pub async fn run_check_mode(args: CheckArgs) -> Result<BatchReport> {
    let settings = load_settings(&args)?;
    init_logging(&settings);

    tracing::info!("Starting tg-spamcheck v{}", env!("CARGO_PKG_VERSION"));

    let pool = ProxyPool::load(&settings.paths.proxies_file)?;
    let pairs = batch::discover_accounts(&args.accounts)?;

    std::fs::create_dir_all(&settings.paths.new_session_dir).with_context(|| {
        format!(
            "Cannot create session directory {:?}",
            settings.paths.new_session_dir
        )
    })?;

    verify_all(&settings, pool, &pairs).await
}

#[cfg(feature = "mtproto")]
async fn verify_all(
    settings: &Settings,
    pool: ProxyPool,
    pairs: &[AccountPair],
) -> Result<BatchReport> {
    use crate::{session::AccountVerifier, transport::MtprotoSessionFactory};

    let verifier = AccountVerifier::new(MtprotoSessionFactory, pool, settings);
    Ok(batch::run_batch(&verifier, pairs).await)
}

#[cfg(not(feature = "mtproto"))]
async fn verify_all(
    _settings: &Settings,
    _pool: ProxyPool,
    _pairs: &[AccountPair],
) -> Result<BatchReport> {
    anyhow::bail!("No Telegram transport compiled in; rebuild with `--features mtproto`")
}
