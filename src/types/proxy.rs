//! Proxy descriptor types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Relay protocol. Only authenticated SOCKS5 with remote DNS is supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProxyProtocol {
    #[default]
    Socks5,
}

/// Connection parameters for one relay
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyDescriptor {
    pub protocol: ProxyProtocol,
    pub host: String,
    pub port: u16,
    /// Resolve Telegram hostnames on the proxy side
    pub remote_dns: bool,
    pub username: String,
    pub password: String,
}

impl ProxyDescriptor {
    /// Create an authenticated SOCKS5 descriptor with remote DNS
    pub fn socks5(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            protocol: ProxyProtocol::Socks5,
            host: host.into(),
            port,
            remote_dns: true,
            username: username.into(),
            password: password.into(),
        }
    }

    /// `host:port` of the relay
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Credentials stay out of log lines.
impl fmt::Display for ProxyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "socks5://{}@{}:{}", self.username, self.host, self.port)
    }
}
