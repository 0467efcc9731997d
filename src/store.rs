//! Run persistence.
//!
//! Audit results are stored as pretty-printed JSON keyed by run id. Ids are
//! restricted to URL-safe characters so they map directly onto file names.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};
use crate::result::AuditResult;

/// Storage for finished audit runs.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Persist a result under its id, replacing any earlier run.
    async fn put(&self, result: &AuditResult) -> Result<()>;

    /// Load a run by id. Unknown or malformed ids yield `Ok(None)`.
    async fn get(&self, id: &str) -> Result<Option<AuditResult>>;
}

/// Whether `id` is safe to use as a file stem.
#[must_use]
pub fn is_valid_run_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn check_id(id: &str) -> Result<()> {
    if is_valid_run_id(id) {
        Ok(())
    } else {
        Err(Error::Store(format!("invalid run id {id:?}")))
    }
}

/// One JSON file per run under a directory.
#[derive(Debug, Clone)]
pub struct FileRunStore {
    dir: PathBuf,
}

impl FileRunStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl RunStore for FileRunStore {
    async fn put(&self, result: &AuditResult) -> Result<()> {
        check_id(&result.id)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::Store(format!("failed to create {}: {e}", self.dir.display())))?;

        let body = serde_json::to_vec_pretty(result)
            .map_err(|e| Error::Store(format!("failed to serialize run {}: {e}", result.id)))?;
        let path = self.path_for(&result.id);
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| Error::Store(format!("failed to write {}: {e}", path.display())))?;

        debug!(run_id = %result.id, path = %path.display(), "stored audit run");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<AuditResult>> {
        if !is_valid_run_id(id) {
            return Ok(None);
        }
        let path = self.path_for(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::Store(format!("failed to read {}: {e}", path.display())));
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| Error::Store(format!("corrupt run {id}: {e}")))
    }
}

/// In-memory store, useful for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryRunStore {
    inner: Mutex<HashMap<String, AuditResult>>,
}

impl MemoryRunStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored runs.
    pub fn len(&self) -> usize {
        self.inner.lock().map_or(0, |runs| runs.len())
    }

    /// Whether no runs are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RunStore for MemoryRunStore {
    async fn put(&self, result: &AuditResult) -> Result<()> {
        check_id(&result.id)?;
        let mut runs = self
            .inner
            .lock()
            .map_err(|_| Error::Store("run store lock poisoned".into()))?;
        runs.insert(result.id.clone(), result.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<AuditResult>> {
        if !is_valid_run_id(id) {
            return Ok(None);
        }
        let runs = self
            .inner
            .lock()
            .map_err(|_| Error::Store("run store lock poisoned".into()))?;
        Ok(runs.get(id).cloned())
    }
}
