mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load settings from a TOML file
pub fn load_config(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut settings: Settings = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    settings.input_dir = expand_path(&settings.input_dir);
    settings.output_dir = expand_path(&settings.output_dir);

    Ok(settings)
}

/// Load settings from default locations or return the built-in defaults
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Settings> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./avifbatch.toml", "~/.config/avifbatch/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Settings::default())
}

/// Expand a leading `~` in a configured directory.
pub fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).as_ref()),
        None => path.to_path_buf(),
    }
}
