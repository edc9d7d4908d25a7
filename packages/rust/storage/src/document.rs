//! A single pretty-printed JSON document on disk.
//!
//! Every mutation is a whole-document read-modify-write performed under a
//! per-path lock, and lands on disk via write-to-temp + rename so readers
//! never observe a half-written file.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, LazyLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use topicflow_shared::{Result, TopicflowError};

/// Process-wide writer locks, one per document path.
static WRITE_LOCKS: LazyLock<std::sync::Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    LazyLock::new(Default::default);

fn lock_for(path: &Path) -> Arc<Mutex<()>> {
    let key = lock_key(path);
    let mut locks = WRITE_LOCKS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    locks.entry(key).or_default().clone()
}

/// Absolute, lexically normalized spelling of `path`, so `data/x.json`,
/// `./data/x.json` and `/cwd/data/../data/x.json` share one lock.
fn lock_key(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut key = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !key.pop() {
                    key.push(component);
                }
            }
            other => key.push(other),
        }
    }
    key
}

/// Handle to one JSON document of type `T`.
///
/// A missing or empty file reads as `T::default()`. A file that exists but
/// does not parse is reported as [`TopicflowError::MalformedStore`] and is
/// never overwritten by [`JsonStore::update`].
pub struct JsonStore<T> {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock = lock_for(&path);
        Self {
            path,
            lock,
            _doc: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current snapshot without taking the writer lock.
    pub async fn load(&self) -> Result<T> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "document absent, using empty value");
                return Ok(T::default());
            }
            Err(e) => return Err(TopicflowError::io(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&content)
            .map_err(|e| TopicflowError::malformed(&self.path, e.to_string()))
    }

    /// Replace the whole document.
    pub async fn save(&self, doc: &T) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.write(doc).await
    }

    /// Read-modify-write under the writer lock. The closure's return value
    /// is passed back once the new document is on disk.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub async fn update<R>(&self, mutate: impl FnOnce(&mut T) -> R) -> Result<R> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        let out = mutate(&mut doc);
        self.write(&doc).await?;
        Ok(out)
    }

    async fn write(&self, doc: &T) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| TopicflowError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(doc).map_err(|e| {
            TopicflowError::Storage(format!(
                "failed to serialize {}: {e}",
                self.path.display()
            ))
        })?;

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.json".to_string());
        let temp = self.path.with_file_name(format!(".{file_name}.tmp"));

        tokio::fs::write(&temp, json)
            .await
            .map_err(|e| TopicflowError::io(&temp, e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| TopicflowError::io(&self.path, e))?;

        debug!(path = %self.path.display(), "wrote JSON document");
        Ok(())
    }
}
