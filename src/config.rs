//! Server configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5001;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind (from MARKSHEET_HOST)
    pub host: String,
    /// Port for the HTTP API (from MARKSHEET_PORT)
    pub port: u16,
    /// SQLite file (from MARKSHEET_DB_PATH). `None` uses the per-user data directory.
    pub database_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup("MARKSHEET_HOST").filter(|h| !h.trim().is_empty()) {
            config.host = host.trim().to_string();
        }

        if let Some(port) = lookup("MARKSHEET_PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("MARKSHEET_PORT is not a valid port: {port:?}"))?;
        }

        config.database_path = lookup("MARKSHEET_DB_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        database_path: Option<PathBuf>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if database_path.is_some() {
            self.database_path = database_path;
        }
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
