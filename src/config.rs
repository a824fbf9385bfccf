use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const CONFIG_FILE: &str = "config.json";
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    /// `None` waits on the provider indefinitely.
    pub request_timeout_secs: Option<u64>,
    /// `None` keeps every history item for the life of the session.
    pub max_history: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            request_timeout_secs: None,
            max_history: None,
        }
    }
}

impl AppConfig {
    /// Per-user config directory, e.g. `~/.config/study-copilot`.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("study-copilot"))
    }

    /// Read-only: a missing file means defaults, and nothing is written.
    pub fn load(config_dir: &Path) -> Self {
        let config_path = config_dir.join(CONFIG_FILE);
        let mut config = if config_path.exists() {
            match Self::read(&config_path) {
                Ok(c) => c,
                Err(e) => {
                    log::warn!("Ignoring unreadable config: {:#}", e);
                    Self::default()
                }
            }
        } else {
            log::debug!("No config at {}; using defaults", config_path.display());
            Self::default()
        };

        // Environment wins over the file so the key never has to live on disk
        if let Some(key) = api_key_from_env() {
            config.gemini_api_key = key;
        }

        config
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save(&self, config_dir: &Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(config_dir)
            .with_context(|| format!("creating {}", config_dir.display()))?;
        let config_path = config_dir.join(CONFIG_FILE);
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("writing {}", config_path.display()))?;
        Ok(())
    }
}

fn api_key_from_env() -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}
