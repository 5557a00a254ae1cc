use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_VERSION: u64 = 1;

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("strms")
}

fn default_key_prefix() -> String {
    "strms_".into()
}

fn default_true() -> bool {
    true
}

/// Where the config file lives unless overridden.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("strms")
        .join("config.json")
}

/// Artificial per-operation delays, in milliseconds.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub login_ms: u64,
    pub register_ms: u64,
    pub crud_ms: u64,
    pub chat_send_ms: u64,
    pub chat_history_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            login_ms: 1000,
            register_ms: 1000,
            crud_ms: 500,
            chat_send_ms: 2000,
            chat_history_ms: 300,
        }
    }
}

impl LatencyConfig {
    /// No simulated delays at all.
    pub fn none() -> Self {
        Self {
            login_ms: 0,
            register_ms: 0,
            crud_ms: 0,
            chat_send_ms: 0,
            chat_history_ms: 0,
        }
    }

    pub fn login(&self) -> Duration {
        Duration::from_millis(self.login_ms)
    }

    pub fn register(&self) -> Duration {
        Duration::from_millis(self.register_ms)
    }

    pub fn crud(&self) -> Duration {
        Duration::from_millis(self.crud_ms)
    }

    pub fn chat_send(&self) -> Duration {
        Duration::from_millis(self.chat_send_ms)
    }

    pub fn chat_history(&self) -> Duration {
        Duration::from_millis(self.chat_history_ms)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub version: u64,
    #[serde(default = "default_data_dir")]
    pub data_directory: PathBuf,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_true")]
    pub seed_demo_users: bool,
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default)]
    pub latency: LatencyConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data_directory: default_data_dir(),
            key_prefix: default_key_prefix(),
            seed_demo_users: true,
            debug_logging: false,
            latency: LatencyConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Read the config file, falling back to defaults when it is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to read config {}: {}", path.display(), e);
                }
                return Self::default();
            }
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(mut config) => {
                if config.version != CONFIG_VERSION {
                    log::info!(
                        "Config {} is version {}, expected {}; missing fields use defaults",
                        path.display(),
                        config.version,
                        CONFIG_VERSION
                    );
                    config.version = CONFIG_VERSION;
                }
                config
            }
            Err(e) => {
                log::warn!("Ignoring corrupt config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}
