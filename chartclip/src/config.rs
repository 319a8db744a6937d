//! Persistent application configuration.
//!
//! Stored as JSON in a platform-appropriate config directory.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// On-disk configuration for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the per-game chart/measure cache tree.
    pub data_root: PathBuf,

    /// Global timeout (seconds) applied to every HTTP call.
    pub http_timeout_s: f32,

    /// Extra attempts after a failed transport-level fetch.
    pub fetch_retries: u32,

    /// User agent sent with acquisition requests. Some chart hosts reject
    /// clients without a browser-looking agent.
    pub user_agent: String,

    /// PaddleOCR model paths.
    pub ocr_detection_model: PathBuf,
    pub ocr_recognition_model: PathBuf,
    pub ocr_charset: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        let home = base.join("chartclip");
        Self {
            data_root: home.join("songs"),
            http_timeout_s: 30.0,
            fetch_retries: 2,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, \
                         like Gecko) Chrome/83.0.4103.116 Safari/537.36"
                .to_string(),
            ocr_detection_model: home.join("models").join("detection.mnn"),
            ocr_recognition_model: home.join("models").join("recognition.mnn"),
            ocr_charset: home.join("models").join("charset.txt"),
        }
    }
}

impl Config {
    /// Path to the config file.
    pub fn path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("config_dir() unavailable")?;
        Ok(base.join("chartclip.json"))
    }

    /// Load configuration from disk, falling back to defaults on missing file.
    pub fn load_or_default() -> Self {
        match Self::try_load() {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load config; using defaults");
                Self::default()
            }
        }
    }

    /// Try to load configuration from disk.
    pub fn try_load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(&path).with_context(|| format!("read {:?}", path))?;
        let cfg = serde_json::from_str(&json).with_context(|| format!("parse {:?}", path))?;
        Ok(cfg)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(&path, json).with_context(|| format!("write {:?}", path))?;
        Ok(())
    }
}
