//! Startup configuration.
//!
//! A single JSON file; every field has a default, and a missing file means
//! all defaults.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::demos::{PskControls, QamControls, QuantizerControls};
use crate::error::{DemoError, DemoResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base seed for the noise generators. `None` seeds from the clock.
    pub seed: Option<u64>,
    /// Filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Reject ambiguous form keys instead of keeping them verbatim.
    pub strict_form_keys: bool,
    pub quantizer: QuantizerControls,
    pub psk: PskControls,
    pub qam: QamControls,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed: None,
            log_level: "info".to_string(),
            strict_form_keys: false,
            quantizer: QuantizerControls::default(),
            psk: PskControls::default(),
            qam: QamControls::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json(text: &str) -> DemoResult<Self> {
        serde_json::from_str(text).map_err(|e| DemoError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> DemoResult<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> DemoResult<Self> {
        match Self::load(path) {
            Err(DemoError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file; using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }
}
