//! Persistence of tool configuration files.
//!
//! Paths are the registry's `~`-relative strings; a store decides what `~` means.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::fs;

use crate::error::StoreError;
use crate::settings::PathSettings;

#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Returns `Ok(None)` when the file does not exist.
    async fn read(&self, path: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the file's contents, creating parent directories as needed.
    async fn write(&self, path: &str, contents: &str) -> Result<(), StoreError>;
}

/// Filesystem store. Writes go to a sibling file that is then renamed over the target, so a
/// reader never sees a half-written document.
#[derive(Debug, Clone)]
pub struct FsConfigStore {
    home: Option<PathBuf>,
}

impl Default for FsConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FsConfigStore {
    pub fn new() -> Self {
        Self {
            home: dirs::home_dir(),
        }
    }

    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }

    pub fn from_settings(paths: &PathSettings) -> Self {
        match &paths.home_override {
            Some(home) => Self::with_home(home.clone()),
            None => Self::new(),
        }
    }

    /// Expands a leading `~` against the store's home directory.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let rest = if path == "~" {
            Some("")
        } else {
            path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\"))
        };
        match rest {
            Some(rest) => {
                let home = self.home.as_ref().ok_or(StoreError::MissingHome)?;
                Ok(if rest.is_empty() { home.clone() } else { home.join(rest) })
            }
            None => Ok(PathBuf::from(path)),
        }
    }
}

#[async_trait]
impl ConfigStore for FsConfigStore {
    async fn read(&self, path: &str) -> Result<Option<String>, StoreError> {
        let target = self.resolve(path)?;
        match fs::read_to_string(&target).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                path: target,
                source,
            }),
        }
    }

    async fn write(&self, path: &str, contents: &str) -> Result<(), StoreError> {
        let target = self.resolve(path)?;
        let staging = staging_path(&target);
        if let Err(source) = write_staged(&target, &staging, contents).await {
            let _ = fs::remove_file(&staging).await;
            return Err(StoreError::Write {
                path: target,
                source,
            });
        }
        log::debug!("wrote {} bytes to {}", contents.len(), target.display());
        Ok(())
    }
}

fn staging_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".vizconf-tmp");
    target.with_file_name(name)
}

async fn write_staged(target: &Path, staging: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(staging, contents).await?;
    if let Ok(metadata) = fs::metadata(target).await {
        fs::set_permissions(staging, metadata.permissions()).await?;
    }
    fs::rename(staging, target).await
}

/// In-memory store keyed by the unexpanded path.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    files: Mutex<HashMap<String, String>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, contents: &str) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&self, path: &str, contents: &str) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), contents.to_string());
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn read(&self, path: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(path))
    }

    async fn write(&self, path: &str, contents: &str) -> Result<(), StoreError> {
        self.insert(path, contents);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn tilde_expands_against_home() {
        let store = FsConfigStore::with_home("/home/dev");
        assert_eq!(
            store.resolve("~/.codex/config.toml").unwrap(),
            PathBuf::from("/home/dev/.codex/config.toml")
        );
        assert_eq!(store.resolve("~").unwrap(), PathBuf::from("/home/dev"));
        assert_eq!(
            store.resolve("/etc/tool.json").unwrap(),
            PathBuf::from("/etc/tool.json")
        );
    }

    #[test]
    fn tilde_without_home_is_an_error() {
        let store = FsConfigStore { home: None };
        assert!(matches!(
            store.resolve("~/.claude.json"),
            Err(StoreError::MissingHome)
        ));
    }

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempdir().unwrap();
        let store = FsConfigStore::with_home(dir.path());
        assert_eq!(store.read("~/.gemini/settings.json").await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_creates_parents_and_leaves_no_staging_file() {
        let dir = tempdir().unwrap();
        let store = FsConfigStore::with_home(dir.path());

        store.write("~/.gemini/settings.json", "{}\n").await.unwrap();
        store
            .write("~/.gemini/settings.json", "{\"model\": \"x\"}\n")
            .await
            .unwrap();

        assert_eq!(
            store.read("~/.gemini/settings.json").await.unwrap().as_deref(),
            Some("{\"model\": \"x\"}\n")
        );
        let entries: Vec<_> = std::fs::read_dir(dir.path().join(".gemini"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, ["settings.json"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn write_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let target = dir.path().join("auth.json");
        std::fs::write(&target, "{}").unwrap();
        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o600)).unwrap();

        let store = FsConfigStore::with_home(dir.path());
        store.write("~/auth.json", "{\"a\": 1}").await.unwrap();

        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn directory_in_place_of_file_is_a_read_error() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("settings.json")).unwrap();
        let store = FsConfigStore::with_home(dir.path());
        assert!(matches!(
            store.read("~/settings.json").await,
            Err(StoreError::Read { .. })
        ));
    }
}
