//! Filesystem-backed bucket: each key is a file below `root`

use super::ObjectStore;
use crate::{ForecastError, Result};
use async_trait::async_trait;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(ForecastError::storage(format!("Invalid object key: {key:?}")));
        }
        Ok(self.root.join(relative))
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "target path must have a parent")
    })?;
    fs::create_dir_all(parent).await?;

    let tmp_path = path.with_extension(format!("{}.tmp", std::process::id()));
    fs::write(&tmp_path, bytes).await?;
    fs::rename(tmp_path, path).await
}

fn storage_error(action: &str, key: &str, e: &io::Error) -> ForecastError {
    ForecastError::storage(format!("Failed to {action} {key}: {e}"))
}

#[async_trait]
impl ObjectStore for LocalStore {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)?).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("read", key, &e)),
        }
    }

    #[instrument(level = "debug", skip(self, body), fields(bytes = body.len()))]
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        let path = self.path_for(key)?;
        write_atomic(&path, &body)
            .await
            .map_err(|e| storage_error("write", key, &e))
    }

    #[instrument(level = "debug", skip(self))]
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        // only walk the deepest directory the prefix fully names
        let start = match prefix.rfind('/') {
            Some(end) => self.path_for(&prefix[..end])?,
            None => self.root.clone(),
        };

        let mut keys = Vec::new();
        let mut pending = vec![start];
        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(storage_error("list", prefix, &e)),
            };
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| storage_error("list", prefix, &e))?
            {
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| storage_error("list", prefix, &e))?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if let Some(key) = self.key_for(&path) {
                    if key.starts_with(prefix) && !key.ends_with(".tmp") {
                        keys.push(key);
                    }
                }
            }
        }
        keys.sort();
        debug!(count = keys.len(), "Listed objects");
        Ok(keys)
    }

    #[instrument(level = "debug", skip(self))]
    async fn copy(&self, from: &str, to: &str) -> Result<()> {
        let source = self.path_for(from)?;
        let target = self.path_for(to)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create directory for", to, &e))?;
        }
        fs::copy(&source, &target)
            .await
            .map_err(|e| storage_error("copy", from, &e))?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(storage_error("delete", key, &e)),
        }
        // drop the partition directory once it is empty
        if let Some(parent) = path.parent().filter(|p| *p != self.root) {
            let _ = fs::remove_dir(parent).await;
        }
        Ok(())
    }
}
