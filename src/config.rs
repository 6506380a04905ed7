use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://api.alquran.cloud/v1";
pub const DEFAULT_EDITION: &str = "en.asad";

/// Runtime config. Everything has a working default; the config file
/// and env vars only exist to point at a mirror or another edition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub api_base: String,
    /// Translation edition identifier understood by the content API.
    pub edition: String,
    /// Override for the cache database directory.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: DEFAULT_API_BASE.to_string(),
            edition: DEFAULT_EDITION.to_string(),
            cache_dir: None,
        }
    }
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mushaf")
        .join("config.json")
}

impl Config {
    /// Resolution order: defaults ← config file ← env vars.
    pub fn resolve() -> Self {
        let mut config = match Self::load_file() {
            Ok(Some(cfg)) => {
                log::info!("Config loaded from file");
                cfg
            }
            Ok(None) => Config::default(),
            Err(e) => {
                log::warn!("Config file error: {}", e);
                Config::default()
            }
        };

        if let Ok(base) = std::env::var("MUSHAF_API_BASE") {
            config.api_base = base;
        }
        if let Ok(edition) = std::env::var("MUSHAF_EDITION") {
            config.edition = edition;
        }
        if let Ok(dir) = std::env::var("MUSHAF_CACHE_DIR") {
            config.cache_dir = Some(PathBuf::from(dir));
        }

        config
    }

    fn load_file() -> Result<Option<Self>, String> {
        let path = config_path();
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        let cfg: Config = serde_json::from_str(&data).map_err(|e| format!("parse config: {e}"))?;
        Ok(Some(cfg))
    }
}
