//! Cross-platform application paths

use std::path::{Path, PathBuf};

use crate::error::{DemoError, DemoResult};

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
}

impl AppPaths {
    /// Resolve the per-user config directory. Nothing is created on disk.
    pub fn new() -> DemoResult<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| DemoError::Config("could not determine config directory".into()))?;
        Ok(Self::with_base(base))
    }

    pub fn with_base(base: impl AsRef<Path>) -> Self {
        Self {
            config_dir: base.as_ref().join("sliderlab"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }
}
