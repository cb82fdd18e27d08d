use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SCHEDULES_FILE: &str = "study_schedules.json";
pub const ANSWER_CACHE_FILE: &str = "ai_cache.json";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A single collection held in memory and mirrored to one pretty-printed JSON
/// document. The whole document is rewritten on every `save()`.
#[derive(Debug)]
pub struct JsonStore<T> {
    path: PathBuf,
    data: T,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Read the document at `path`. A missing file yields an empty collection
    /// and nothing is written until the first `save()`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no store file yet, starting empty");
            return Ok(Self {
                path,
                data: T::default(),
            });
        }

        let io_err = |source| StorageError::Io {
            path: path.clone(),
            source,
        };
        let mut file = File::open(&path).map_err(io_err)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(io_err)?;
        let data = if contents.trim().is_empty() {
            T::default()
        } else {
            serde_json::from_str(&contents).map_err(|source| StorageError::Json {
                path: path.clone(),
                source,
            })?
        };
        Ok(Self { path, data })
    }

    /// Persist the current content using a temporary file and a rename to
    /// avoid partial writes.
    pub fn save(&self) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content =
            serde_json::to_string_pretty(&self.data).map_err(|source| StorageError::Json {
                path: self.path.clone(),
                source,
            })?;
        let temp = self.path.with_extension("tmp");
        let mut f = File::create(&temp).map_err(io_err)?;
        f.write_all(content.as_bytes()).map_err(io_err)?;
        f.sync_all().map_err(io_err)?;
        fs::rename(&temp, &self.path).map_err(io_err)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }
}
