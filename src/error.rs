//! Errors raised at the crate's boundaries (files, config, network).
//!
//! The annotation pipeline itself never fails; see [`crate::pipeline`].

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[cfg(feature = "fetch")]
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("response is not an audio data URL")]
    InvalidAudio,
}
