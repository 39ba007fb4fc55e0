use crate::checks::df::FilesystemLevels;
use crate::checks::space::SpaceParams;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub space: SpaceParams,

    /// Filesystem levels applied to every primary volume.
    #[serde(default)]
    pub volume: FilesystemLevels,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// HTTPS port of the REST API
    pub port: u16,
    /// Connect and per-request timeout in seconds
    pub timeout_secs: u64,
    /// PEM bundle used to verify the appliance certificate
    pub ca_bundle: PathBuf,
    /// Login user; the command line wins when both are set
    pub user: Option<String>,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port:         443,
            timeout_secs: 60,
            ca_bundle:    PathBuf::from("/etc/ssl/certs/ca-certificates.crt"),
            user:         None,
        }
    }
}

// ── Load ─────────────────────────────────────────────────────────────

impl Config {
    /// Read `explicit` if given (it must exist), else the per-user config
    /// file if present, else the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return read(path);
        }
        match Config::config_path() {
            Some(path) if path.exists() => read(&path),
            _ => {
                debug!("no config file, using defaults");
                Ok(Config::default())
            }
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("powerstore-agent").join("config.toml"))
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn read(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    let cfg: Config = toml::from_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(cfg)
}
