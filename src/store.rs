//! Local snapshot of the archive, used whenever the remote service cannot answer.
//!
//! The whole archive is kept as one JSON document under a single key of a
//! key-value backend:
//! ```plain
//! snapshots
//!   the_curator_v2_storage -> [{"id":"1", ...}, {"id":"2", ...}]
//! ```

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, TableError};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::{
    article::{Article, ArticleId},
    seed::seed_articles,
};

/// Key the snapshot is stored under.
pub const SNAPSHOT_KEY: &str = "the_curator_v2_storage";

const SNAPSHOTS: TableDefinition<&str, &str> = TableDefinition::new("snapshots");

/// Errors raised by a snapshot backend.
#[derive(Debug, Error)]
pub enum FailToAccessBackend {
    /// The redb database failed.
    #[error("Storage error: {0}")]
    Redb(#[from] redb::Error),
    /// I/O error while preparing the storage location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A previous writer panicked while holding the storage.
    #[error("Storage lock is poisoned")]
    Poisoned,
}

/// A scoped key-value store holding serialized snapshots.
pub trait SnapshotBackend: Send + Sync + fmt::Debug {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, FailToAccessBackend>;

    /// Store `value` under `key`, replacing what was there.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), FailToAccessBackend>;
}

/// Backend living only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, FailToAccessBackend> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| FailToAccessBackend::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), FailToAccessBackend> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| FailToAccessBackend::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Backend persisted in a redb database file.
pub struct RedbBackend {
    path: PathBuf,
    db: Database,
}

impl fmt::Debug for RedbBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedbBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RedbBackend {
    /// Open the database at `path`, creating it and its parent directories if needed.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the database cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FailToAccessBackend> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path).map_err(redb::Error::from)?;
        Ok(Self {
            path: path.to_path_buf(),
            db,
        })
    }

    /// Location of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self, key: &str) -> Result<Option<String>, redb::Error> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(SNAPSHOTS) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let value = table.get(key)?;
        Ok(value.map(|guard| guard.value().to_string()))
    }

    fn write_raw(&self, key: &str, value: &str) -> Result<(), redb::Error> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(SNAPSHOTS)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }
}

impl SnapshotBackend for RedbBackend {
    fn read(&self, key: &str) -> Result<Option<String>, FailToAccessBackend> {
        Ok(self.read_raw(key)?)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), FailToAccessBackend> {
        Ok(self.write_raw(key, value)?)
    }
}

/// Reads and writes the archive snapshot, seeding it on first use.
///
/// None of its operations fail: read problems fall back to the seed set and
/// write problems are logged and dropped.
#[derive(Debug, Clone)]
pub struct FallbackStore {
    backend: Arc<dyn SnapshotBackend>,
    key: String,
}

impl FallbackStore {
    /// Store over the given backend, using [`SNAPSHOT_KEY`].
    pub fn new(backend: impl SnapshotBackend + 'static) -> Self {
        Self::from_shared(Arc::new(backend))
    }

    /// Store over a backend shared with other owners.
    #[must_use]
    pub fn from_shared(backend: Arc<dyn SnapshotBackend>) -> Self {
        Self {
            backend,
            key: SNAPSHOT_KEY.to_string(),
        }
    }

    /// Store kept in memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Use a different key for the snapshot.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// The backend the snapshot is kept in.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn SnapshotBackend> {
        &self.backend
    }

    /// Current snapshot. An absent or unreadable snapshot is replaced by the seed set.
    #[must_use]
    pub fn load(&self) -> Vec<Article> {
        let raw = match self.backend.read(&self.key) {
            Ok(raw) => raw,
            Err(err) => {
                error!("Local storage error: {err}");
                return seed_articles();
            }
        };

        if let Some(raw) = raw {
            match serde_json::from_str(&raw) {
                Ok(snapshot) => return snapshot,
                Err(err) => warn!("Discarding unreadable snapshot: {err}"),
            }
        }

        debug!("Seeding local archive");
        let seed = seed_articles();
        self.save(&seed);
        seed
    }

    /// The snapshot as stored, empty when there is none or it cannot be read.
    ///
    /// Unlike [`FallbackStore::load`] this never seeds the backend.
    #[must_use]
    pub fn stored(&self) -> Vec<Article> {
        match self.backend.read(&self.key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("Local storage error: {err}");
                Vec::new()
            }
        }
    }

    /// Replace the stored snapshot.
    pub fn save(&self, snapshot: &[Article]) {
        let raw = match serde_json::to_string(snapshot) {
            Ok(raw) => raw,
            Err(err) => {
                error!("Storage save failed: {err}");
                return;
            }
        };
        if let Err(err) = self.backend.write(&self.key, &raw) {
            error!("Storage save failed: {err}");
        }
    }

    /// Look an article up by id.
    #[must_use]
    pub fn find(&self, id: &ArticleId) -> Option<Article> {
        self.load().into_iter().find(|article| article.id == *id)
    }

    /// Put `article` in front of the snapshot and persist the result.
    pub fn prepend(&self, article: Article) -> Vec<Article> {
        let mut snapshot = self.load();
        snapshot.insert(0, article);
        self.save(&snapshot);
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::Draft;

    #[derive(Debug)]
    struct BrokenBackend;

    impl SnapshotBackend for BrokenBackend {
        fn read(&self, _key: &str) -> Result<Option<String>, FailToAccessBackend> {
            Err(FailToAccessBackend::Poisoned)
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), FailToAccessBackend> {
            Err(FailToAccessBackend::Poisoned)
        }
    }

    #[test]
    fn first_load_persists_the_seed() {
        let store = FallbackStore::in_memory();
        assert!(store.backend().read(SNAPSHOT_KEY).unwrap().is_none());

        let snapshot = store.load();
        assert_eq!(snapshot, seed_articles());
        assert!(store.backend().read(SNAPSHOT_KEY).unwrap().is_some());
    }

    #[test]
    fn stored_never_seeds() {
        let store = FallbackStore::in_memory();
        assert!(store.stored().is_empty());
        assert!(store.backend().read(SNAPSHOT_KEY).unwrap().is_none());

        store.load();
        assert_eq!(store.stored(), seed_articles());
        assert!(FallbackStore::new(BrokenBackend).stored().is_empty());
    }

    #[test]
    fn load_returns_the_stored_snapshot_verbatim() {
        let store = FallbackStore::in_memory();
        let mut snapshot = seed_articles();
        snapshot.reverse();
        store.save(&snapshot);
        assert_eq!(store.load(), snapshot);
    }

    #[test]
    fn unreadable_snapshot_is_reseeded() {
        let store = FallbackStore::in_memory();
        store.backend().write(SNAPSHOT_KEY, "{not json").unwrap();

        assert_eq!(store.load(), seed_articles());
        let raw = store.backend().read(SNAPSHOT_KEY).unwrap().unwrap();
        let persisted: Vec<Article> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, seed_articles());
    }

    #[test]
    fn broken_backend_still_yields_the_seed() {
        let store = FallbackStore::new(BrokenBackend);
        assert_eq!(store.load(), seed_articles());
        store.save(&[]);
        let article = Article::from_draft(Draft::new("T", "D", "C"), ArticleId::from("x"));
        assert_eq!(store.prepend(article).len(), seed_articles().len() + 1);
    }

    #[test]
    fn prepend_puts_the_article_first() {
        let store = FallbackStore::in_memory();
        let article = Article::from_draft(Draft::new("T", "D", "C"), ArticleId::from("x"));
        let snapshot = store.prepend(article.clone());
        assert_eq!(snapshot[0], article);
        assert_eq!(store.load().len(), seed_articles().len() + 1);
        assert_eq!(store.find(&ArticleId::from("x")), Some(article));
    }

    #[test]
    fn find_matches_numeric_ids_by_text() {
        let store = FallbackStore::in_memory();
        assert!(store.find(&ArticleId::from(2)).is_some());
        assert!(store.find(&ArticleId::from(99)).is_none());
    }

    #[test]
    fn keys_are_scoped() {
        let backend: Arc<dyn SnapshotBackend> = Arc::new(MemoryBackend::new());
        let first = FallbackStore::from_shared(backend.clone());
        let second = FallbackStore::from_shared(backend).with_key("other");
        first.save(&[]);
        assert!(first.load().is_empty());
        assert_eq!(second.load(), seed_articles());
    }

    #[test]
    fn redb_snapshot_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("archive.redb");
        let article = Article::from_draft(Draft::new("T", "D", "C"), ArticleId::from("x"));

        {
            let store = FallbackStore::new(RedbBackend::open(&path).unwrap());
            assert!(store.backend().read(SNAPSHOT_KEY).unwrap().is_none());
            store.prepend(article.clone());
        }

        let store = FallbackStore::new(RedbBackend::open(&path).unwrap());
        let snapshot = store.load();
        assert_eq!(snapshot.len(), seed_articles().len() + 1);
        assert_eq!(snapshot[0], article);
    }
}
