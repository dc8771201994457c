//! Settings loader for Parley.
//!
//! Reads `config.toml` (by default `~/.parley/config.toml`) and deserializes
//! it into [`Settings`]. A missing file yields the defaults; a file that
//! exists but cannot be read or parsed is an error, since silently ignoring
//! a broken prompt configuration would compile the wrong prompts.

use std::path::{Path, PathBuf};

use anyhow::Context;
use parley_types::config::Settings;

/// Environment variable overriding the settings file location.
pub const CONFIG_PATH_ENV: &str = "PARLEY_CONFIG";

/// Load settings from `path`.
///
/// - If the file does not exist, returns [`Settings::default()`].
/// - If the file exists but fails to read or parse, returns an error naming the file.
pub async fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    let settings = toml::from_str::<Settings>(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        inline_prompts = settings.prompts.inline.len(),
        "Settings loaded"
    );
    Ok(settings)
}

/// Resolve the settings file path.
///
/// `PARLEY_CONFIG` wins when set. Otherwise `~/.parley/config.toml`, falling
/// back to `.parley/config.toml` relative to the current directory only when
/// no home directory can be determined.
pub fn resolve_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }

    let base = dirs::home_dir()
        .map(|home| home.join(".parley"))
        .unwrap_or_else(|| PathBuf::from(".parley"));
    base.join("config.toml")
}
