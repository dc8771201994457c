//! Application state for the `parley` binary.

use std::path::PathBuf;

use anyhow::Result;
use parley_infra::config::{load_settings, resolve_config_path};
use parley_types::config::Settings;

/// Settings resolved from the config file and command-line overrides.
pub struct AppState {
    pub settings: Settings,
    pub config_path: PathBuf,
}

impl AppState {
    /// Load settings from `config` (or the default location) and apply
    /// command-line overrides.
    pub async fn init(config: Option<PathBuf>, templates_dir: Option<PathBuf>) -> Result<Self> {
        let config_path = config.unwrap_or_else(resolve_config_path);
        let mut settings = load_settings(&config_path).await?;
        if let Some(dir) = templates_dir {
            settings.prompts.templates_dir = dir;
        }

        tracing::debug!(
            config = %config_path.display(),
            templates_dir = %settings.prompts.templates_dir.display(),
            precedence = %settings.prompts.precedence,
            "Application state initialized"
        );
        Ok(Self {
            settings,
            config_path,
        })
    }
}
