// JSON file implementation of the instance store.
//
// The file holds a pretty-printed array of instances. Writes go to a
// sibling temp file first and are renamed into place.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use pifleet_core::{CoreError, Instance, InstanceStore};
use tracing::debug;

use crate::ConfigError;

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the collection. A missing or blank file is an empty fleet.
    pub async fn read(&self) -> Result<Vec<Instance>, ConfigError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "instance file absent, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the collection on disk.
    pub async fn write(&self, instances: &[Instance]) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(instances).map_err(|source| ConfigError::Json {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), count = instances.len(), "instances saved");
        Ok(())
    }
}

impl InstanceStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<Instance>, CoreError> {
        self.read().await.map_err(CoreError::store)
    }

    async fn save(&self, instances: &[Instance]) -> Result<(), CoreError> {
        self.write(instances).await.map_err(CoreError::store)
    }
}
