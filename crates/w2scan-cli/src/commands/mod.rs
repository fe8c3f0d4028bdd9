//! Subcommands.

pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use tracing::debug;

use w2scan_core::{ExtractionCoordinator, W2Config};

/// `<config dir>/w2scan/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("w2scan")
        .join("config.json")
}

/// Load the config from `path`, else from the default location when it
/// exists, else defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<W2Config> {
    if let Some(path) = path {
        return W2Config::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config at {}", default_path.display());
        Ok(W2Config::from_file(&default_path)?)
    } else {
        Ok(W2Config::default())
    }
}

/// Coordinator for the process and batch commands.
pub fn build_coordinator(config: &W2Config, no_llm: bool) -> ExtractionCoordinator {
    if no_llm {
        ExtractionCoordinator::pattern_only(config)
    } else {
        ExtractionCoordinator::from_config(config)
    }
}
