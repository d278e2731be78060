//! JSON file loader and saver.
//!
//! The file holds a single JSON array with every record of the store. It is read
//! once when the store opens and rewritten in full after every mutation.

use std::{
    fmt,
    io::{self, Write},
    marker::PhantomData,
    path::{Path, PathBuf},
};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::{fs, task};
use tracing::trace;

use datalayer_core::{
    backend::{Loader, Saver},
    config::StoreConfig,
    error::{PersistenceError, PersistenceResult},
};

/// Loads and saves records as a JSON array in a single file.
///
/// A missing file is treated as "nothing stored yet" and an empty file as an
/// empty record set. Saves write to a fresh temporary file next to the target
/// and then rename it over the target, creating parent directories on demand.
///
/// # Example
///
/// ```ignore
/// use datalayer::file::JsonFilePersister;
/// use datalayer::backend::{Loader, Saver};
///
/// let persister = JsonFilePersister::<Note>::new("./data/notes.json");
/// persister.save("backup", &notes).await?;
///
/// let restored = persister.load("restore").await?.unwrap_or_default();
/// ```
pub struct JsonFilePersister<T> {
    path: Option<PathBuf>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFilePersister<T> {
    /// Creates a persister bound to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            _marker: PhantomData,
        }
    }

    /// Creates a persister from the `path` of a [`StoreConfig`].
    ///
    /// The persister is left unconfigured when the config has no path; loading
    /// and saving then fail with a configuration error.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            path: config.path.as_ref().map(PathBuf::from),
            _marker: PhantomData,
        }
    }

    /// Path of the backing file, if configured.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn require_path(&self) -> PersistenceResult<&Path> {
        self.path()
            .ok_or_else(|| PersistenceError::Configuration("Data file path is not set".to_string()))
    }
}

impl<T> Default for JsonFilePersister<T> {
    fn default() -> Self {
        Self {
            path: None,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for JsonFilePersister<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for JsonFilePersister<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonFilePersister")
            .field("path", &self.path)
            .finish()
    }
}

#[async_trait]
impl<T> Loader<T> for JsonFilePersister<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn load(&self, correlation_id: &str) -> PersistenceResult<Option<Vec<T>>> {
        let path = self.require_path()?;

        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                trace!(correlation_id = %correlation_id, path = %path.display(), "Data file does not exist yet");
                return Ok(None);
            }
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        if bytes.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let items: Vec<T> = serde_json::from_slice(&bytes)?;
        trace!(correlation_id = %correlation_id, path = %path.display(), "Read {} items", items.len());

        Ok(Some(items))
    }
}

#[async_trait]
impl<T> Saver<T> for JsonFilePersister<T>
where
    T: Serialize + Send + Sync + 'static,
{
    async fn save(&self, correlation_id: &str, items: &[T]) -> PersistenceResult<()> {
        let path = self.require_path()?;
        let json = serde_json::to_vec(items)?;

        write_replacing(path, json)
            .await
            .map_err(|source| PersistenceError::Write {
                path: path.display().to_string(),
                source,
            })?;

        trace!(correlation_id = %correlation_id, path = %path.display(), "Wrote {} items", items.len());
        Ok(())
    }
}

/// Writes `contents` to a uniquely named temporary sibling of `path`, then renames
/// it over `path`.
///
/// Every call gets its own temporary file, so overlapping saves of the same
/// store never rename each other's file away.
async fn write_replacing(path: &Path, contents: Vec<u8>) -> io::Result<()> {
    let dir = match path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        Some(dir) => {
            fs::create_dir_all(dir).await?;
            dir.to_path_buf()
        }
        None => PathBuf::from("."),
    };

    let target = path.to_path_buf();
    let mut prefix = target.file_name().unwrap_or_default().to_owned();
    prefix.push(".");

    task::spawn_blocking(move || {
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(&dir)?;
        file.write_all(&contents)?;
        file.as_file().sync_all()?;
        file.persist(&target).map_err(|err| err.error)?;
        Ok::<_, io::Error>(())
    })
    .await
    .map_err(io::Error::other)?
}
