//! Common test utilities and helpers
//!
//! This module provides shared fixtures for integration tests.

/// Test helper functions
pub mod helpers {
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    pub const CREDENTIALS: &str = r#"{"app_id": 1, "app_hash": "h", "phone": "15550001234"}"#;

    /// Scratch workspace with an accounts directory and a proxy list
    pub struct Workspace {
        pub root: TempDir,
    }

    impl Workspace {
        pub fn new() -> Self {
            let root = TempDir::new().unwrap();
            std::fs::create_dir(root.path().join("accounts")).unwrap();
            Self { root }
        }

        pub fn accounts(&self) -> PathBuf {
            self.root.path().join("accounts")
        }

        pub fn config_home(&self) -> PathBuf {
            self.root.path().join("xdg")
        }

        /// Write the proxy list and return its path
        pub fn proxies(&self, content: &str) -> PathBuf {
            let path = self.root.path().join("proxies.txt");
            std::fs::write(&path, content).unwrap();
            path
        }

        pub fn add_account(&self, stem: &str) {
            write_pair(&self.accounts(), stem);
        }
    }

    pub fn write_pair(dir: &Path, stem: &str) {
        std::fs::write(dir.join(format!("{stem}.session")), b"").unwrap();
        std::fs::write(dir.join(format!("{stem}.json")), CREDENTIALS).unwrap();
    }
}
