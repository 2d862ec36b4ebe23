//! Configuration loading for the server and client binaries.
//!
//! Layers defaults, an optional JSON config file, and `AUCTION_`-prefixed
//! environment variables, in that order of increasing priority.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::error::{AuctionError, Result};

pub const DEFAULT_HOSTNAME: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 58085;
pub const DEFAULT_DATA_DIR: &str = "./auction_data";

const CONFIG_LOCATIONS: &[&str] = &["./auctionhouse.json", "~/.config/auctionhouse.json"];

/// Server-side configuration: listen address and the store's root directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub verbose: bool,
}

fn default_hostname() -> String {
    DEFAULT_HOSTNAME.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_data_dir() -> String {
    DEFAULT_DATA_DIR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            port: default_port(),
            data_dir: default_data_dir(),
            verbose: false,
        }
    }
}

impl ServerConfig {
    /// Loads configuration, optionally overridden by `config_path`, then by
    /// `AUCTION_*` environment variables.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            for candidate in CONFIG_LOCATIONS {
                let expanded = shellexpand::tilde(candidate).to_string();
                if PathBuf::from(&expanded).exists() {
                    builder = builder.add_source(config::File::with_name(&expanded));
                }
            }
        }

        let built = builder
            .add_source(config::Environment::with_prefix("auction"))
            .build()?;

        built.try_deserialize().map_err(AuctionError::from)
    }

    /// The resolved store root, with `~` expanded.
    pub fn data_dir_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir).to_string())
    }

    /// The socket address the server should bind both the UDP and TCP
    /// listeners to.
    pub fn listen_addr(&self) -> Result<std::net::SocketAddr> {
        let ip: IpAddr = self
            .hostname
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        Ok(std::net::SocketAddr::new(ip, self.port))
    }
}

/// Client-side configuration: which server to talk to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            port: default_port(),
        }
    }
}

impl ClientConfig {
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_server_config_matches_protocol_defaults() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.hostname, "127.0.0.1");
        assert_eq!(cfg.port, 58085);
    }

    #[test]
    fn load_with_no_file_falls_back_to_defaults() {
        let cfg = ServerConfig::load(Some("/nonexistent/path/does-not-exist.json"));
        assert!(cfg.is_err() || cfg.unwrap().port == DEFAULT_PORT);
    }
}
