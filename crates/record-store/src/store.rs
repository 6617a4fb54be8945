//! JSON-file and in-memory record stores.

use crate::error::StoreError;
use crate::types::{Collection, Record};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

/// Append-only storage of records grouped by collection.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load every record of a collection in insertion order.
    ///
    /// A missing or empty backing document yields an empty list.
    async fn load(&self, collection: Collection) -> Result<Vec<Value>, StoreError>;

    /// Append one record and return the new collection size.
    async fn append(&self, collection: Collection, record: Value) -> Result<usize, StoreError>;

    /// Number of records in a collection.
    async fn count(&self, collection: Collection) -> Result<usize, StoreError> {
        Ok(self.load(collection).await?.len())
    }
}

/// Typed access on top of [`RecordStore`].
#[async_trait]
pub trait RecordStoreExt: RecordStore {
    async fn load_all<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        self.load(R::COLLECTION)
            .await?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(StoreError::from))
            .collect()
    }

    async fn append_record<R: Record>(&self, record: &R) -> Result<usize, StoreError> {
        let value = serde_json::to_value(record)?;
        self.append(R::COLLECTION, value).await
    }
}

impl<S: RecordStore + ?Sized> RecordStoreExt for S {}

/// One collection's backing document plus its writer guard.
struct CollectionFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CollectionFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }
}

/// Collections stored as pretty-printed JSON arrays on disk.
///
/// Every append rewrites the whole document. Appends to the same collection
/// are serialized so a concurrent read-modify-write never drops a record.
pub struct JsonFileStore {
    users: CollectionFile,
    contacts: CollectionFile,
}

impl JsonFileStore {
    /// Create a store with explicit document paths.
    pub fn new(users_path: impl Into<PathBuf>, contacts_path: impl Into<PathBuf>) -> Self {
        let store = Self {
            users: CollectionFile::new(users_path.into()),
            contacts: CollectionFile::new(contacts_path.into()),
        };

        info!(
            "JSON record store initialized (users={:?}, contacts={:?})",
            store.users.path, store.contacts.path
        );

        store
    }

    /// Create a store using the default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(
            dir.join(Collection::Users.default_file_name()),
            dir.join(Collection::Contacts.default_file_name()),
        )
    }

    /// Path of the document backing a collection.
    pub fn path(&self, collection: Collection) -> &Path {
        &self.file(collection).path
    }

    fn file(&self, collection: Collection) -> &CollectionFile {
        match collection {
            Collection::Users => &self.users,
            Collection::Contacts => &self.contacts,
        }
    }
}

async fn read_document(path: &Path) -> Result<Vec<Value>, StoreError> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

async fn write_document(path: &Path, records: &[Value]) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(records)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    // Write atomically using temp file + rename
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, json.as_bytes()).await.map_err(io_err)?;
    fs::rename(&temp_path, path).await.map_err(io_err)?;

    Ok(())
}

#[async_trait]
impl RecordStore for JsonFileStore {
    #[instrument(skip(self))]
    async fn load(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        read_document(&self.file(collection).path).await
    }

    #[instrument(skip(self, record))]
    async fn append(&self, collection: Collection, record: Value) -> Result<usize, StoreError> {
        let file = self.file(collection);
        let _guard = file.write_lock.lock().await;

        let mut records = read_document(&file.path).await?;
        records.push(record);
        write_document(&file.path, &records).await?;

        debug!("Appended to {} (total: {})", collection, records.len());
        Ok(records.len())
    }
}

/// Process-local store for tests and ephemeral runs.
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Value>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn load(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn append(&self, collection: Collection, record: Value) -> Result<usize, StoreError> {
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection).or_default();
        records.push(record);
        Ok(records.len())
    }
}
