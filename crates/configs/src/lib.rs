use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CAPTIONS_FILE: &str = "data/captions.json";
pub const DEFAULT_STATIC_DIR: &str = "public";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Directory with the gallery assets served at `/`.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: None,
            static_dir: default_static_dir(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_captions_file")]
    pub captions_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { captions_file: default_captions_file() }
    }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { DEFAULT_PORT }
fn default_static_dir() -> String { DEFAULT_STATIC_DIR.into() }
fn default_max_body_bytes() -> usize { DEFAULT_MAX_BODY_BYTES }
fn default_captions_file() -> PathBuf { PathBuf::from(DEFAULT_CAPTIONS_FILE) }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file (if any), then environment overrides, then validation.
    /// A missing config file is not an error; defaults apply.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Apply `HOST`, `PORT`, `TOKIO_WORKER_THREADS`, `STATIC_DIR`,
    /// `MAX_BODY_BYTES` and `CAPTIONS_FILE` from the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| anyhow!("PORT must be a number in 1..=65535, got {port:?}"))?;
        }
        if let Some(threads) = lookup("TOKIO_WORKER_THREADS") {
            self.server.worker_threads = threads.trim().parse().ok();
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            self.server.static_dir = dir;
        }
        if let Some(limit) = lookup("MAX_BODY_BYTES") {
            self.server.max_body_bytes = limit
                .trim()
                .parse()
                .map_err(|_| anyhow!("MAX_BODY_BYTES must be a byte count, got {limit:?}"))?;
        }
        if let Some(file) = lookup("CAPTIONS_FILE") {
            self.storage.captions_file = PathBuf::from(file);
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("server.max_body_bytes must be > 0"));
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.captions_file.as_os_str().is_empty() {
            return Err(anyhow!("storage.captions_file must not be empty"));
        }
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}
