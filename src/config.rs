//! Runtime configuration loaded from `heronet.toml`.
//!
//! Every field has a default, so a missing file is not an error. A file
//! that exists but does not parse is.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HeroNetError, Result};

/// Environment variable that overrides `data_dir`.
pub const DATA_DIR_ENV: &str = "HERONET_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroNetConfig {
    /// Directory holding both tables.
    pub data_dir: PathBuf,
    /// Hero table file name, relative to `data_dir`.
    pub heroes_file: String,
    /// Link table file name, relative to `data_dir`.
    pub links_file: String,
    /// Where the startup snapshot image is written.
    pub snapshot_file: PathBuf,
    /// Heroes created within this many days count as recent.
    pub recent_days: i64,
    /// Length of the top-connected ranking.
    pub top_k: usize,
    /// Hero whose details the startup report prints.
    pub spotlight: String,
    /// Seed for the force-directed layout.
    pub layout_seed: u64,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Scale factor applied when rasterizing to PNG.
    pub raster_scale: f32,
}

impl Default for HeroNetConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            heroes_file: "superheroes.csv".to_string(),
            links_file: "links.csv".to_string(),
            snapshot_file: PathBuf::from("superhero_network.png"),
            recent_days: 3,
            top_k: 3,
            spotlight: "dataiskole".to_string(),
            layout_seed: 42,
            canvas_width: 2000,
            canvas_height: 1600,
            raster_scale: 1.0,
        }
    }
}

impl HeroNetConfig {
    /// Load config from `path`, falling back to defaults when the file is absent.
    /// `HERONET_DATA_DIR` overrides the configured data directory.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let raw = fs::read_to_string(path).map_err(|e| HeroNetError::Config {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            Self::from_toml(&raw).map_err(|reason| HeroNetError::Config {
                path: path.to_path_buf(),
                reason,
            })?
        } else {
            debug!(config = %path.display(), "no config file, using defaults");
            Self::default()
        };

        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }

        Ok(config)
    }

    fn from_toml(raw: &str) -> std::result::Result<Self, String> {
        toml::from_str(raw).map_err(|e| e.to_string())
    }

    pub fn heroes_path(&self) -> PathBuf {
        self.data_dir.join(&self.heroes_file)
    }

    pub fn links_path(&self) -> PathBuf {
        self.data_dir.join(&self.links_file)
    }
}
