//! The engine's own settings file (`~/.config/vizconf/config.toml`).

mod load;
mod types;

use std::path::PathBuf;

use crate::error::SettingsError;

pub use load::{load_settings, save_settings, LoadedSettings};
pub use types::{EngineSettings, LoggingSettings, NetworkSettings, PathSettings, ProxyKind};

pub fn default_settings_path() -> Result<PathBuf, SettingsError> {
    let home = dirs::home_dir().ok_or(SettingsError::MissingHome)?;
    Ok(home.join(".config").join("vizconf").join("config.toml"))
}
