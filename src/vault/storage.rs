//! JSON document storage with atomic writes and advisory locking.
//!
//! A `JsonEngine` owns one file path. Reads never fail because the file
//! is missing or unparsable: both cases yield an empty document, which
//! callers treat as "uninitialized". Writes go to a temp file in the same
//! directory and are renamed over the target, so a reader never sees a
//! half-written document.
//!
//! # Concurrency Safety
//!
//! Separate invocations may touch the same file. Wrap every
//! read-modify-write cycle in `with_lock()`, which holds an exclusive
//! `fs2` lock on a sibling `<file>.lock` for the duration of the closure.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use serde_json::{Map, Value};

use crate::errors::{OniLockError, Result};

/// A mapping-shaped JSON document.
pub type Document = Map<String, Value>;

/// Default timeout for acquiring a file lock.
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Delay between lock attempts.
const LOCK_POLL: Duration = Duration::from_millis(50);

/// Durable read/write of one JSON document at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonEngine {
    path: PathBuf,
    lock_timeout: Duration,
}

impl JsonEngine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout: LOCK_TIMEOUT,
        }
    }

    /// Override how long `with_lock` waits for a contended lock.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Path of the document on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document.
    ///
    /// A missing file is created empty (parents included). Empty or
    /// unparsable contents, or JSON that is not an object, yield an
    /// empty document.
    pub fn read(&self) -> Result<Document> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "creating empty document");
            self.create_empty()?;
            return Ok(Document::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Document::new());
        }

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "document is not a JSON object; treating it as empty"
                );
                Ok(Document::new())
            }
        }
    }

    /// `true` if the file holds a non-empty document.
    pub fn has_data(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        Ok(!self.read()?.is_empty())
    }

    /// Replace the file contents with `document`, atomically.
    ///
    /// 1. Serialize to pretty JSON.
    /// 2. Write and sync a temp file in the same directory.
    /// 3. Rename the temp file over the target path.
    pub fn write(&self, document: &Document) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| OniLockError::SerializationError(format!("document: {e}")))?;

        let parent = self.ensure_parent()?;
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy()
        ));

        {
            let mut file = open_private(&tmp_path, true)?;
            // A stale temp file keeps its old mode; tighten it before writing.
            restrict_permissions(&tmp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "document written");
        Ok(())
    }

    /// Remove the document file. A missing file is not an error.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "document deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Path of the sibling lock file.
    pub fn lock_path(&self) -> PathBuf {
        let name = self.path.file_name().unwrap_or_default().to_string_lossy();
        self.path.with_file_name(format!("{name}.lock"))
    }

    /// Remove the sibling lock file. Only call this once the document
    /// itself is gone and no lock is held.
    pub fn remove_lock_file(&self) -> Result<()> {
        match fs::remove_file(self.lock_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Execute `f` while holding an exclusive lock on this document.
    ///
    /// Polls for up to the lock timeout (five seconds unless overridden)
    /// before giving up with `LockTimeout`.
    /// The lock is released when `f` returns, whatever its outcome.
    pub fn with_lock<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Self) -> Result<R>,
    {
        self.ensure_parent()?;
        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)?;

        let start = Instant::now();
        loop {
            match lock_file.try_lock_exclusive() {
                Ok(()) => break,
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if start.elapsed() > self.lock_timeout {
                        return Err(OniLockError::LockTimeout(lock_path));
                    }
                    std::thread::sleep(LOCK_POLL);
                }
                Err(e) => return Err(e.into()),
            }
        }

        let result = f(self);
        let _ = lock_file.unlock();
        result
    }

    fn create_empty(&self) -> Result<()> {
        self.ensure_parent()?;
        open_private(&self.path, false)?;
        restrict_permissions(&self.path)
    }

    /// Create the parent directory (owner-only) if needed and return it.
    fn ensure_parent(&self) -> Result<PathBuf> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !parent.exists() {
            fs::create_dir_all(&parent)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&parent, fs::Permissions::from_mode(0o700))?;
            }
        }
        Ok(parent)
    }
}

/// Open `path` for writing, creating it owner-only (0o600 on Unix).
fn open_private(path: &Path, truncate: bool) -> std::io::Result<fs::File> {
    let mut options = OpenOptions::new();
    options.create(true).write(true).truncate(truncate);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}

/// Owner-only read/write on Unix.
fn restrict_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// Named storage engines, owned by whoever builds the `VaultManager`.
///
/// Replaces a process-wide singleton: two registries never share state,
/// so tests can run several isolated vaults side by side.
#[derive(Debug, Default)]
pub struct EngineRegistry {
    engines: BTreeMap<String, JsonEngine>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the engine for `name` and return it.
    pub fn add_engine(&mut self, name: &str, path: impl Into<PathBuf>) -> &JsonEngine {
        let engine = JsonEngine::new(path);
        self.engines.insert(name.to_string(), engine);
        &self.engines[name]
    }

    pub fn get_engine(&self, name: &str) -> Option<&JsonEngine> {
        self.engines.get(name)
    }

    pub fn remove_engine(&mut self, name: &str) -> Option<JsonEngine> {
        self.engines.remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn engine() -> (TempDir, JsonEngine) {
        let dir = TempDir::new().unwrap();
        let engine = JsonEngine::new(dir.path().join("nested").join("doc.json"));
        (dir, engine)
    }

    #[test]
    fn read_missing_file_creates_it_empty() {
        let (_dir, engine) = engine();
        assert!(!engine.path().exists());

        let doc = engine.read().unwrap();
        assert!(doc.is_empty());
        assert!(engine.path().exists());
    }

    #[test]
    fn write_then_read_roundtrip() {
        let (_dir, engine) = engine();
        let mut doc = Document::new();
        doc.insert("alice".into(), json!({"filepath": "abc"}));

        engine.write(&doc).unwrap();
        assert_eq!(engine.read().unwrap(), doc);
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let (_dir, engine) = engine();
        engine.read().unwrap();
        fs::write(engine.path(), "{ not json").unwrap();
        assert!(engine.read().unwrap().is_empty());

        fs::write(engine.path(), "[1, 2, 3]").unwrap();
        assert!(engine.read().unwrap().is_empty());
    }

    #[test]
    fn write_fully_replaces_contents() {
        let (_dir, engine) = engine();
        let mut big = Document::new();
        big.insert("a".into(), json!("x".repeat(500)));
        engine.write(&big).unwrap();

        let mut small = Document::new();
        small.insert("b".into(), json!(1));
        engine.write(&small).unwrap();

        assert_eq!(engine.read().unwrap(), small);
    }

    #[test]
    fn write_leaves_no_temp_file() {
        let (_dir, engine) = engine();
        engine.write(&Document::new()).unwrap();

        let parent = engine.path().parent().unwrap();
        let leftovers: Vec<_> = fs::read_dir(parent)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn delete_is_idempotent() {
        let (_dir, engine) = engine();
        engine.write(&Document::new()).unwrap();
        engine.delete().unwrap();
        assert!(!engine.path().exists());
        engine.delete().unwrap();
    }

    #[test]
    fn has_data_distinguishes_empty_documents() {
        let (_dir, engine) = engine();
        assert!(!engine.has_data().unwrap());

        let mut doc = Document::new();
        doc.insert("k".into(), json!(true));
        engine.write(&doc).unwrap();
        assert!(engine.has_data().unwrap());
    }

    #[test]
    fn with_lock_returns_closure_result() {
        let (_dir, engine) = engine();
        let value = engine
            .with_lock(|e| {
                let mut doc = e.read()?;
                doc.insert("n".into(), json!(1));
                e.write(&doc)?;
                Ok(doc.len())
            })
            .unwrap();
        assert_eq!(value, 1);
        assert!(engine.lock_path().exists());
    }

    #[test]
    fn with_lock_propagates_errors() {
        let (_dir, engine) = engine();
        let result: Result<()> = engine.with_lock(|_| Err(OniLockError::UserCancelled));
        assert!(matches!(result, Err(OniLockError::UserCancelled)));

        // The lock was released, so it can be taken again.
        assert!(engine.with_lock(|_| Ok(())).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn written_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, engine) = engine();
        engine.write(&Document::new()).unwrap();
        let mode = fs::metadata(engine.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn with_lock_times_out_when_held_elsewhere() {
        let (_dir, engine) = engine();
        let engine = engine.with_lock_timeout(Duration::from_millis(150));
        engine.read().unwrap();

        let holder = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(engine.lock_path())
            .unwrap();
        holder.lock_exclusive().unwrap();

        let started = Instant::now();
        let result = engine.with_lock(|_| Ok(()));
        assert!(matches!(result, Err(OniLockError::LockTimeout(p)) if p == engine.lock_path()));
        assert!(started.elapsed() < Duration::from_secs(3));

        holder.unlock().unwrap();
        assert!(engine.with_lock(|_| Ok(())).is_ok());
    }

    #[test]
    fn remove_lock_file_is_idempotent() {
        let (_dir, engine) = engine();
        engine.with_lock(|_| Ok(())).unwrap();
        assert!(engine.lock_path().exists());

        engine.remove_lock_file().unwrap();
        assert!(!engine.lock_path().exists());
        engine.remove_lock_file().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn stale_temp_file_does_not_widen_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, engine) = engine();
        engine.read().unwrap();
        let tmp = engine.path().with_file_name(".doc.json.tmp");
        fs::write(&tmp, "leftover").unwrap();
        fs::set_permissions(&tmp, fs::Permissions::from_mode(0o644)).unwrap();

        engine.write(&Document::new()).unwrap();

        let mode = fs::metadata(engine.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!tmp.exists());
    }

    #[test]
    fn registry_keeps_engines_isolated() {
        let mut registry = EngineRegistry::new();
        registry.add_engine("setup", "/tmp/a.json");
        registry.add_engine("alice", "/tmp/b.json");

        assert!(registry.get_engine("alice").is_some());
        assert_eq!(
            registry.get_engine("setup").unwrap().path(),
            Path::new("/tmp/a.json")
        );

        registry.add_engine("setup", "/tmp/c.json");
        assert_eq!(
            registry.get_engine("setup").unwrap().path(),
            Path::new("/tmp/c.json")
        );

        assert!(registry.remove_engine("alice").is_some());
        assert!(registry.get_engine("alice").is_none());
    }
}
