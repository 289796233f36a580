//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] over a single JSON document.  A missing file
//! means first run and yields defaults; anything unreadable is reported as
//! corrupted instead of silently replaced.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::ConfigPort;
use crate::config::MonitorConfig;
use crate::error::ConfigError;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<MonitorConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Config: {} not found, using defaults", self.path.display());
                return Ok(MonitorConfig::default());
            }
            Err(e) => {
                warn!("Config: reading {} failed: {}", self.path.display(), e);
                return Err(ConfigError::Io);
            }
        };

        let cfg: MonitorConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("Config: {} is not valid JSON: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        cfg.validate()?;
        info!("Config: loaded {}", self.path.display());
        Ok(cfg)
    }

    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let text = serde_json::to_string_pretty(config).map_err(|_| ConfigError::Io)?;
        fs::write(&self.path, text).map_err(|e| {
            warn!("Config: writing {} failed: {}", self.path.display(), e);
            ConfigError::Io
        })?;
        info!("Config: saved {}", self.path.display());
        Ok(())
    }
}
