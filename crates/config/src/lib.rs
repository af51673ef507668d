use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const APP_NAME: &str = "courier-app";
const KEYCHAIN_SERVICE: &str = "courier.app.credentials";

pub const API_TOKEN_SECRET: &str = "api_token";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_remote_kind")]
    pub kind: String, // "mock" | "http"
    pub base_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_mock_failure_rate")]
    pub mock_failure_rate: f64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            kind: default_remote_kind(),
            base_url: None,
            request_timeout_secs: default_request_timeout_secs(),
            mock_failure_rate: default_mock_failure_rate(),
        }
    }
}

impl RemoteConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    /// URL probed with `HEAD`; falls back to the remote base URL.
    pub probe_url: Option<String>,
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_url: None,
            probe_timeout_secs: default_probe_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl ConnectivityConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_auto_sync")]
    pub auto_sync: bool,
    pub audit_log: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_sync: default_auto_sync(),
            audit_log: None,
        }
    }
}

fn default_remote_kind() -> String {
    "mock".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_mock_failure_rate() -> f64 {
    0.1
}

fn default_probe_timeout_secs() -> u64 {
    3
}

fn default_poll_interval_secs() -> u64 {
    15
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".courier_store")
}

fn default_auto_sync() -> bool {
    true
}

impl AppConfig {
    /// Rejects settings the composition root cannot act on.
    pub fn validate(&self) -> Result<()> {
        match self.remote.kind.as_str() {
            "mock" => {}
            "http" => {
                if self.remote.base_url.as_deref().unwrap_or("").is_empty() {
                    bail!("remote.base_url is required when remote.kind = \"http\"");
                }
            }
            other => bail!("unknown remote.kind: {other}"),
        }
        if !(0.0..=1.0).contains(&self.remote.mock_failure_rate) {
            bail!("remote.mock_failure_rate must be between 0 and 1");
        }
        if self.remote.request_timeout_secs == 0 {
            bail!("remote.request_timeout_secs must be positive");
        }
        Ok(())
    }

    /// URL the connectivity monitor should probe, if any.
    pub fn probe_url(&self) -> Option<String> {
        self.connectivity
            .probe_url
            .clone()
            .or_else(|| self.remote.base_url.clone())
    }
}

pub fn load() -> Result<AppConfig> {
    let cfg: AppConfig = confy::load(APP_NAME, None).context("Failed to load app config")?;
    Ok(cfg)
}

pub fn store(cfg: &AppConfig) -> Result<()> {
    confy::store(APP_NAME, None, cfg).context("Failed to store app config")?;
    Ok(())
}

/// Store a secret in the OS keychain
pub fn store_secret(key: &str, value: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, key)?;
    entry.set_password(value)?;
    Ok(())
}

/// Retrieve a secret from the OS keychain
pub fn get_secret(key: &str) -> Result<String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, key)?;
    let password = entry.get_password()?;
    Ok(password)
}

/// Delete a secret from the OS keychain
pub fn delete_secret(key: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, key)?;
    entry.delete_password()?;
    Ok(())
}
