//! Optional TOML configuration file
//!
//! Every key is optional; anything given on the command line wins.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use catlog_types::{OutputFormat, SourceMode};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// auto | journal | authlog
    pub source: Option<SourceMode>,
    /// table | json | csv
    pub format: Option<OutputFormat>,
    /// `false` turns table colors off
    pub color: Option<bool>,
    /// Program run for journal queries
    pub journal_command: Option<String>,
    /// Auth log candidates, first existing one is read
    pub authlog_paths: Option<Vec<PathBuf>>,
}

impl Config {
    /// `<config dir>/catlog/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("catlog").join("config.toml"))
    }

    /// Load the explicit file, or the default one if it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::read(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::read(&path),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        debug!(path = %path.display(), ?config, "Loaded config");
        Ok(config)
    }

    /// Table color is allowed unless the file says otherwise
    pub fn color_disabled(&self) -> bool {
        self.color == Some(false)
    }
}
