//! Backing stores for the active-session map.
//!
//! The authority only needs keyed get / atomic replace / remove.  Two
//! implementations ship here: a process-local map and a JSON file at
//! `state_path/sessions/active_sessions.json` that several processes (a
//! server and the `ssa` tool, say) can share.  A shared cache or database
//! can implement [`SessionBackend`] the same way.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fs2::FileExt;
use parking_lot::RwLock;

use ssa_domain::config::{StoreBackendKind, StoreConfig};
use ssa_domain::error::{Error, Result};
use ssa_domain::session::SessionRecord;
use ssa_domain::trace::TraceEvent;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Backend trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Storage collaborator for session records, keyed by user id.
///
/// Implementations report outages as [`Error::StoreUnavailable`]; retries,
/// if any, are the implementation's business.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Short name used in logs (`"memory"`, `"file"`, …).
    fn name(&self) -> &'static str;

    /// Fetch the record for `user_id`, if any.
    async fn get(&self, user_id: &str) -> Result<Option<SessionRecord>>;

    /// Store `record`, replacing whatever was stored for `record.user_id`
    /// in one step.
    async fn put(&self, record: SessionRecord) -> Result<()>;

    /// Remove the record for `user_id`.  Absent records are not an error.
    async fn remove(&self, user_id: &str) -> Result<()>;

    /// All stored records, in no particular order.
    async fn list(&self) -> Result<Vec<SessionRecord>>;
}

/// Build the backend selected by `config`.
pub fn open_backend(config: &StoreConfig) -> Result<Arc<dyn SessionBackend>> {
    match config.backend {
        StoreBackendKind::Memory => Ok(Arc::new(MemoryBackend::new())),
        StoreBackendKind::File => Ok(Arc::new(FileBackend::open(&config.state_path)?)),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process-local session map.
#[derive(Default)]
pub struct MemoryBackend {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, user_id: &str) -> Result<Option<SessionRecord>> {
        Ok(self.sessions.read().get(user_id).cloned())
    }

    async fn put(&self, record: SessionRecord) -> Result<()> {
        self.sessions
            .write()
            .insert(record.user_id.clone(), record);
        Ok(())
    }

    async fn remove(&self, user_id: &str) -> Result<()> {
        self.sessions.write().remove(user_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SessionRecord>> {
        Ok(self.sessions.read().values().cloned().collect())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// JSON file backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

type SessionMap = HashMap<String, SessionRecord>;

/// Session map persisted as JSON and shared between processes.
///
/// Nothing is cached: every call re-reads the file under an `fs2` advisory
/// lock on a sibling `.lock` file (shared for reads, exclusive for
/// read-modify-write), so a revoke from `ssa` is seen by a running server
/// and cannot be overwritten by it.  Writes go to a temp file that is
/// renamed into place.  File I/O runs on the blocking pool.
pub struct FileBackend {
    paths: StorePaths,
}

impl FileBackend {
    /// Open (creating if needed) the store at
    /// `state_path/sessions/active_sessions.json`.
    ///
    /// A file that exists but does not parse is an error: starting empty
    /// would silently forget revocations.
    pub fn open(state_path: &Path) -> Result<Self> {
        let dir = state_path.join("sessions");
        std::fs::create_dir_all(&dir)?;

        let paths = StorePaths {
            sessions: dir.join("active_sessions.json"),
            lock: dir.join("active_sessions.lock"),
        };
        let sessions = paths.load()?;

        tracing::info!(
            sessions = sessions.len(),
            path = %paths.sessions.display(),
            "session store opened"
        );
        TraceEvent::SessionStoreLoaded {
            backend: "file".into(),
            sessions: sessions.len(),
        }
        .emit();

        Ok(Self { paths })
    }

    pub fn path(&self) -> &Path {
        &self.paths.sessions
    }

    /// Run `f` against the store files on the blocking pool, reporting any
    /// failure as a store outage.
    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&StorePaths) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let paths = self.paths.clone();
        let shown = paths.sessions.display().to_string();
        tokio::task::spawn_blocking(move || f(&paths))
            .await
            .map_err(|e| Error::StoreUnavailable(format!("{shown}: store task failed: {e}")))?
            .map_err(|e| match e {
                Error::StoreUnavailable(_) => e,
                other => Error::StoreUnavailable(format!("{shown}: {other}")),
            })
    }
}

#[async_trait]
impl SessionBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn get(&self, user_id: &str) -> Result<Option<SessionRecord>> {
        let user_id = user_id.to_owned();
        self.run(move |paths| Ok(paths.load()?.remove(&user_id)))
            .await
    }

    async fn put(&self, record: SessionRecord) -> Result<()> {
        self.run(move |paths| {
            paths.update(|sessions| {
                sessions.insert(record.user_id.clone(), record);
                true
            })
        })
        .await
    }

    async fn remove(&self, user_id: &str) -> Result<()> {
        let user_id = user_id.to_owned();
        self.run(move |paths| paths.update(|sessions| sessions.remove(&user_id).is_some()))
            .await
    }

    async fn list(&self) -> Result<Vec<SessionRecord>> {
        self.run(|paths| Ok(paths.load()?.into_values().collect()))
            .await
    }
}

/// Locations of the session file and its advisory lock file.
#[derive(Debug, Clone)]
struct StorePaths {
    sessions: PathBuf,
    lock: PathBuf,
}

impl StorePaths {
    /// Open the lock file and block until the lock is granted.  The lock is
    /// released when the returned handle drops.
    fn lock(&self, exclusive: bool) -> Result<File> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock)?;
        if exclusive {
            file.lock_exclusive()?;
        } else {
            file.lock_shared()?;
        }
        Ok(file)
    }

    fn read(&self) -> Result<SessionMap> {
        if !self.sessions.exists() {
            return Ok(SessionMap::new());
        }
        let raw = std::fs::read_to_string(&self.sessions)?;
        if raw.trim().is_empty() {
            return Ok(SessionMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write(&self, sessions: &SessionMap) -> Result<()> {
        let json = serde_json::to_string_pretty(sessions)?;
        let tmp = self.sessions.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.sessions)?;
        Ok(())
    }

    /// Snapshot of the file under a shared lock.
    fn load(&self) -> Result<SessionMap> {
        let _lock = self.lock(false)?;
        self.read()
    }

    /// Read-modify-write under an exclusive lock.  `f` returns whether it
    /// changed anything; unchanged maps are not rewritten.
    fn update(&self, f: impl FnOnce(&mut SessionMap) -> bool) -> Result<()> {
        let _lock = self.lock(true)?;
        let mut sessions = self.read()?;
        if f(&mut sessions) {
            self.write(&sessions)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssa_domain::session::SessionContext;

    fn record(user: &str, token: &str) -> SessionRecord {
        SessionRecord::new(user, token.into(), SessionContext::default())
    }

    #[tokio::test]
    async fn memory_put_replaces() {
        let store = MemoryBackend::new();
        store.put(record("alice", "t1")).await.unwrap();
        store.put(record("alice", "t2")).await.unwrap();

        let got = store.get("alice").await.unwrap().unwrap();
        assert_eq!(got.token, "t2");
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn memory_remove_absent_is_ok() {
        let store = MemoryBackend::new();
        store.remove("nobody").await.unwrap();
        assert!(store.get("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_write_through() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBackend::open(dir.path()).unwrap();
        store.put(record("alice", "t1")).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let on_disk: HashMap<String, SessionRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(on_disk["alice"].token, "t1");

        store.remove("alice").await.unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        let on_disk: HashMap<String, SessionRecord> = serde_json::from_str(&raw).unwrap();
        assert!(on_disk.is_empty());
    }

    #[tokio::test]
    async fn file_write_failure_leaves_disk_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBackend::open(dir.path()).unwrap();
        store.put(record("alice", "t1")).await.unwrap();

        // A non-empty directory where the temp file goes makes every write fail.
        let tmp = store.path().with_extension("json.tmp");
        std::fs::create_dir(&tmp).unwrap();
        std::fs::write(tmp.join("blocker"), "x").unwrap();

        let err = store.put(record("alice", "t2")).await.unwrap_err();
        assert!(err.is_store_unavailable());
        assert_eq!(store.get("alice").await.unwrap().unwrap().token, "t1");

        let err = store.remove("alice").await.unwrap_err();
        assert!(err.is_store_unavailable());
        assert!(store.get("alice").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unreadable_file_is_store_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBackend::open(dir.path()).unwrap();
        std::fs::write(store.path(), "{ not json").unwrap();

        let err = store.get("alice").await.unwrap_err();
        assert!(err.is_store_unavailable());
    }

    #[tokio::test]
    async fn lock_file_sits_next_to_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBackend::open(dir.path()).unwrap();
        store.put(record("alice", "t1")).await.unwrap();
        assert!(dir.path().join("sessions/active_sessions.lock").exists());
    }

    #[test]
    fn open_backend_picks_memory_by_default() {
        let backend = open_backend(&StoreConfig::default()).unwrap();
        assert_eq!(backend.name(), "memory");
    }
}
