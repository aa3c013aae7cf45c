//! TOML configuration.
//!
//! ```toml
//! [display]
//! color_by = "freq"
//! color_mode = "underline"
//!
//! [tracking]
//! lookahead_secs = 0.25
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tracker::{DEFAULT_EXAMPLE_LIMIT, DEFAULT_LOOKAHEAD_SECS};
use crate::view::DisplayOptions;

/// Interval at which the playback clock is sampled.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayOptions,
    pub tracking: TrackingConfig,
    pub services: ServiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Forward lookahead added to sampled playback time
    pub lookahead_secs: f64,
    /// Clock sampling interval
    pub poll_interval_ms: u64,
    /// Example sentences collected per dictionary lookup
    pub example_limit: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        TrackingConfig {
            lookahead_secs: DEFAULT_LOOKAHEAD_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            example_limit: DEFAULT_EXAMPLE_LIMIT,
        }
    }
}

impl TrackingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the media/subtitle API
    pub media_base_url: String,
    /// Base URL of the dictionary/TTS API
    pub dict_base_url: String,
    /// Language translations are requested in
    pub target_lang: String,
    /// Source language when none is given
    pub default_lang: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            media_base_url: "https://api-cdn.dioco.io".to_string(),
            dict_base_url: "https://api-cdn-plus.dioco.io".to_string(),
            target_lang: "en".to_string(),
            default_lang: "es".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Config::default())
        }
    }
}
