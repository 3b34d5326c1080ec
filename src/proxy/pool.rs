//! Proxy list loading and per-account ordering

use crate::{Error, Result, types::ProxyDescriptor};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::sync::Mutex;

/// Immutable list of relays loaded once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyPool {
    proxies: Vec<ProxyDescriptor>,
}

impl ProxyPool {
    /// Create a pool from already parsed descriptors
    pub fn new(proxies: Vec<ProxyDescriptor>) -> Self {
        Self { proxies }
    }

    /// Load a proxy list file, one `host:port:username:password` per line
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Cannot read proxy list {:?}: {}", path, e)))?;
        let pool = Self::parse(&content)?;
        tracing::info!("Loaded {} proxies from {:?}", pool.len(), path);
        Ok(pool)
    }

    /// Parse proxy list text. Only trailing blank lines are tolerated.
    pub fn parse(content: &str) -> Result<Self> {
        let proxies = content
            .trim_end()
            .lines()
            .enumerate()
            .map(|(idx, line)| parse_line(line).map_err(|e| at_line(idx + 1, e)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { proxies })
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn as_slice(&self) -> &[ProxyDescriptor] {
        &self.proxies
    }

    /// Fresh random permutation of the pool; the pool itself is untouched
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<ProxyDescriptor> {
        let mut order = self.proxies.clone();
        order.shuffle(rng);
        order
    }
}

/// Parse a single `host:port:username:password` line
pub fn parse_line(line: &str) -> Result<ProxyDescriptor> {
    let fields: Vec<&str> = line.trim().split(':').collect();
    let [host, port, username, password] = fields.as_slice() else {
        return Err(Error::config(format!(
            "expected host:port:username:password, got {} fields",
            fields.len()
        )));
    };

    if host.is_empty() {
        return Err(Error::config("empty proxy host"));
    }
    let port: u16 = port
        .parse()
        .map_err(|e| Error::config(format!("invalid proxy port {:?}: {}", port, e)))?;

    Ok(ProxyDescriptor::socks5(*host, port, *username, *password))
}

fn at_line(line_no: usize, err: Error) -> Error {
    match err {
        Error::Config(msg) => Error::Config(format!("proxy list line {}: {}", line_no, msg)),
        other => other,
    }
}

/// Source of per-account proxy orderings.
///
/// Each call to [`ProxyShuffler::order`] yields an independent copy, so no
/// ordering state is shared between accounts.
#[derive(Debug)]
pub struct ProxyShuffler {
    rng: Mutex<StdRng>,
}

impl ProxyShuffler {
    /// Seeded shuffler for reproducible runs, entropy-seeded otherwise
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Attempt order for the next account
    pub fn order(&self, pool: &ProxyPool) -> Vec<ProxyDescriptor> {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        pool.shuffled(&mut *rng)
    }
}
