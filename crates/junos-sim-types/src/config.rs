//! Server configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SimError};

/// How clients reach the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// SSH with password authentication (`ssh admin@host -p 2222`).
    #[default]
    Ssh,
    /// Plain TCP with a `login:` prompt, usable from `telnet` or `nc`.
    Telnet,
}

/// Runtime configuration for the simulated device and its listener.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Address the listener binds to.
    pub bind_address: String,
    /// TCP port to listen on.
    pub port: u16,
    /// Device hostname, shown in the prompt.
    pub hostname: String,
    /// Login user name.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Maximum simultaneous sessions.
    pub max_connections: usize,
    /// Seconds allowed to complete login (0 = no limit).
    pub login_timeout_secs: u64,
    /// Failed login attempts before the connection is dropped.
    pub max_login_attempts: u32,
    /// Put telnet clients into character mode and strip IAC sequences.
    pub telnet_negotiation: bool,
    /// Which listener to run.
    pub transport: Transport,
    /// SSH host key file; generated on first start if missing.
    pub host_key_path: PathBuf,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 2222,
            hostname: "JUNOS-MX".to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            max_connections: 16,
            login_timeout_secs: 30,
            max_login_attempts: 3,
            telnet_negotiation: true,
            transport: Transport::Ssh,
            host_key_path: PathBuf::from("host_key"),
        }
    }
}

impl SimConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(toml_str)?;
        Ok(config)
    }

    /// Load a configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.hostname.trim().is_empty() {
            return Err(SimError::Config("hostname must not be empty".into()));
        }
        if self.username.is_empty() {
            return Err(SimError::Config("username must not be empty".into()));
        }
        if self.max_connections == 0 {
            return Err(SimError::Config("max_connections must be at least 1".into()));
        }
        if self.max_login_attempts == 0 {
            return Err(SimError::Config(
                "max_login_attempts must be at least 1".into(),
            ));
        }
        if self.transport == Transport::Ssh && self.host_key_path.as_os_str().is_empty() {
            return Err(SimError::Config("host_key_path must not be empty".into()));
        }
        Ok(())
    }

    /// `host:port` string suitable for binding.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
