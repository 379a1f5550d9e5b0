//! File-backed anchor store.
//!
//! One map per file under a directory. Writes go to `<name>.tmp` first and
//! are renamed into place, so a crash mid-write never leaves a torn map.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use super::{AnchorStore, StoreLocation};
use crate::config::NavigationConfig;
use crate::{Error, Result};

/// Writes every save to `<dir>/<file_name>`, overwriting the previous one.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    file_name: String,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self { dir: dir.into(), file_name: file_name.into() }
    }

    pub fn from_config(dir: impl Into<PathBuf>, config: &NavigationConfig) -> Self {
        Self::new(dir, config.map_file_name.clone())
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

#[async_trait]
impl AnchorStore for FileStore {
    async fn write(&self, bytes: &[u8]) -> Result<StoreLocation> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path();
        let tmp_path = self.dir.join(format!("{}.tmp", self.file_name));

        tokio::fs::write(&tmp_path, bytes).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        info!(path = %path.display(), bytes = bytes.len(), "anchor graph written");
        Ok(StoreLocation(path.to_string_lossy().into_owned()))
    }

    async fn read(&self, location: &StoreLocation) -> Result<Vec<u8>> {
        let path = Path::new(&location.0);
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::LocationNotFound(location.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
