use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub listen_addr: String,
    /// Number of worker threads, each running its own event loop.
    pub workers: usize,
    /// Capacity of the per-reactor ready-event buffer.
    pub max_events: usize,
    /// Maximum simultaneous connections per worker.
    pub max_connections: usize,
    /// Scratch read-buffer size; also the receive buffer's growth unit.
    pub chunk_size: usize,
    /// Upper bound on the bytes accepted for a single request.
    pub max_request_size: usize,
    /// Upper bound on the length of a request target path.
    pub max_target_len: usize,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Document root served by the file lookup.
    pub root: PathBuf,
    /// File served when the target is `/`.
    pub index: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            workers: 4,
            max_events: 128,
            max_connections: 1024,
            chunk_size: 2048,
            max_request_size: 8192,
            max_target_len: 255,
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public"),
            index: "index.html".to_string(),
        }
    }
}

impl Config {
    /// Loads the configuration from the YAML file named by the first CLI
    /// argument or the `EDGEHOG_CONFIG` env var, falling back to defaults.
    /// `LISTEN` overrides the listen address either way.
    pub fn load() -> Result<Self> {
        let path = std::env::args()
            .nth(1)
            .or_else(|| std::env::var("EDGEHOG_CONFIG").ok());

        let mut cfg = match path {
            Some(path) => Self::from_file(&path)?,
            None => Config::default(),
        };

        if let Ok(addr) = std::env::var("LISTEN") {
            cfg.server.listen_addr = addr;
        }

        Ok(cfg)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {path}"))?;
        serde_yaml::from_str(&raw).with_context(|| format!("cannot parse config file {path}"))
    }
}
