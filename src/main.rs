//! Bulk Telegram spam-restriction checker
//!
//! Verifies every account found under a directory and prints a JSON report.
//!
//! # Usage
//!
//! ```bash
//! tg-spamcheck --accounts ./accounts --proxies proxies.txt
//! ```
//!
//! # Output
//!
//! ```json
//! {
//!   "checkedAt": "2025-01-01T00:00:00Z",
//!   "good": ["alice"],
//!   "bad": ["bob"],
//!   "accounts": [
//!     { "name": "alice", "verdict": "clean" },
//!     { "name": "bob", "verdict": "restricted" }
//!   ]
//! }
//! ```

use clap::Parser;
use std::path::PathBuf;
use tg_spamcheck::cli::{CheckArgs, run_check_mode};

/// Check Telegram accounts for spam restrictions
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "tg-spamcheck")]
struct Cli {
    /// Directory with `<name>.session` and `<name>.json` pairs
    #[arg(short, long, value_name = "DIR")]
    accounts: PathBuf,

    /// Proxy list, one `host:port:username:password` per line
    #[arg(short, long, value_name = "FILE")]
    proxies: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory receiving the migrated sessions
    #[arg(long, value_name = "DIR")]
    session_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let args = CheckArgs {
        accounts: cli.accounts,
        proxies: cli.proxies,
        config: cli.config,
        session_dir: cli.session_dir,
        verbose: cli.verbose,
    };

    match run_check_mode(args).await {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize report: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
