use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::SettingsError;

use super::types::EngineSettings;

#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: EngineSettings,
    pub path: PathBuf,
    pub exists: bool,
}

/// Reads the settings file, falling back to defaults when it does not exist.
pub fn load_settings(path_override: Option<PathBuf>) -> Result<LoadedSettings, SettingsError> {
    let path = match path_override {
        Some(path) => path,
        None => super::default_settings_path()?,
    };
    match fs::read_to_string(&path) {
        Ok(contents) => Ok(LoadedSettings {
            settings: toml::from_str(&contents)?,
            path,
            exists: true,
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::debug!("no settings file at {}, using defaults", path.display());
            Ok(LoadedSettings {
                settings: EngineSettings::default(),
                path,
                exists: false,
            })
        }
        Err(err) => Err(SettingsError::Io(err)),
    }
}

pub fn save_settings(settings: &EngineSettings, path: &Path) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(settings)?;
    fs::write(path, contents)?;
    secure_file_permissions(path)?;
    Ok(())
}

fn secure_file_permissions(path: &Path) -> Result<(), SettingsError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = fs::metadata(path) {
            let mut perms = metadata.permissions();
            if perms.mode() & 0o077 != 0 {
                perms.set_mode(0o600);
                fs::set_permissions(path, perms)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ProxyKind;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let loaded = load_settings(Some(dir.path().join("config.toml"))).unwrap();
        assert!(!loaded.exists);
        assert_eq!(loaded.settings, EngineSettings::default());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut settings = EngineSettings::default();
        settings.network.proxy_type = ProxyKind::Socks5;
        settings.network.proxy_address = Some("127.0.0.1:1080".to_string());
        settings.logging.level = "debug".to_string();

        save_settings(&settings, &path).unwrap();
        let loaded = load_settings(Some(path)).unwrap();

        assert!(loaded.exists);
        assert_eq!(loaded.settings, settings);
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        save_settings(&EngineSettings::default(), &path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[network\n").unwrap();
        assert!(matches!(
            load_settings(Some(path)),
            Err(SettingsError::Toml(_))
        ));
    }
}
