use crate::difficulty::Tier;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub therapist_code: String,
    pub default_difficulty: Option<Tier>,
    pub words_per_exercise: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            therapist_code: "demo".to_string(),
            default_difficulty: None,
            words_per_exercise: 10,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = match ProjectDirs::from("", "", "typeling") {
            Some(pd) => pd.config_dir().join("config.json"),
            None => PathBuf::from("typeling_config.json"),
        };
        Self { path }
    }

    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// A missing or unreadable config file silently yields the defaults
    fn load(&self) -> Config {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    fn save(&self, cfg: &Config) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(cfg).map_err(io::Error::other)?;
        fs::write(&self.path, json)
    }
}
