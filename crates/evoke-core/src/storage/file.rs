//! JSON file repository
//!
//! Records live in a single file holding a JSON array. Each call loads the
//! file, applies the change and writes it back atomically (write to a temp
//! file, then rename), so the file is never left half written. A missing
//! file reads as an empty collection.

use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::criteria::Criteria;
use crate::outcome::Outcome;
use crate::repository::Repository;
use crate::storage::collection::Collection;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::{settle, settle_optional, Record};
use crate::strategy::StoreKind;

/// Repository backed by a JSON array file
pub struct JsonFileRepository<T> {
    kind: StoreKind,
    path: PathBuf,
    lock: Mutex<()>,
    available: AtomicBool,
    _records: PhantomData<fn() -> T>,
}

impl<T: Record> JsonFileRepository<T> {
    pub fn new(kind: StoreKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
            lock: Mutex::new(()),
            available: AtomicBool::new(true),
            _records: PhantomData,
        }
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Switch the store on or off
    pub fn set_available(&self, available: bool) {
        debug!("{} file store available: {}", self.kind, available);
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Every record in the file, regardless of availability
    pub async fn records(&self) -> StorageResult<Vec<T>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_records())
    }

    async fn load(&self) -> StorageResult<Collection<T>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Collection::new()),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                return Err(StorageError::PermissionDenied {
                    path: self.path.clone(),
                    source: e,
                })
            }
            Err(e) => {
                return Err(StorageError::ReadError {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        let records: Vec<T> =
            serde_json::from_slice(&bytes).map_err(|e| StorageError::InvalidFormat {
                path: self.path.clone(),
                details: e.to_string(),
            })?;
        Ok(Collection::from_records(records))
    }

    async fn save(&self, collection: &Collection<T>) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(collection.records())?;
        atomic_write(&self.path, &bytes).await?;
        debug!("Wrote {} records to {:?}", collection.len(), self.path);
        Ok(())
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(StorageError::Unavailable { kind: self.kind })
        }
    }

    async fn read<D>(&self, f: impl FnOnce(&Collection<T>) -> D) -> StorageResult<D> {
        self.check_available()?;
        let _guard = self.lock.lock().await;
        let collection = self.load().await?;
        Ok(f(&collection))
    }

    /// Load, apply `f`, and save only if `f` succeeded
    async fn write<D>(
        &self,
        f: impl FnOnce(&mut Collection<T>) -> StorageResult<D>,
    ) -> StorageResult<D> {
        self.check_available()?;
        let _guard = self.lock.lock().await;
        let mut collection = self.load().await?;
        let data = f(&mut collection)?;
        if let Err(e) = self.save(&collection).await {
            warn!("Failed to save {:?}: {}", self.path, e);
            return Err(e);
        }
        Ok(data)
    }
}

#[async_trait]
impl<T: Record> Repository<T> for JsonFileRepository<T> {
    async fn find(&self, criteria: &Criteria) -> Outcome<Vec<T>> {
        settle(self.kind, self.read(|c| c.find(criteria)).await)
    }

    async fn find_one(&self, criteria: &Criteria) -> Outcome<T> {
        settle_optional(self.kind, self.read(|c| c.find_one(criteria)).await)
    }

    async fn store(&self, models: Vec<T>) -> Outcome<Vec<T>> {
        settle(self.kind, self.write(|c| c.insert(models)).await)
    }

    async fn store_one(&self, model: T) -> Outcome<T> {
        let result = self
            .write(|c| c.insert(vec![model.clone()]).map(|_| model))
            .await;
        settle(self.kind, result)
    }

    async fn update(&self, models: Vec<T>) -> Outcome<Vec<T>> {
        settle(self.kind, self.write(|c| Ok(c.update(models))).await)
    }

    async fn update_one(&self, model: T) -> Outcome<T> {
        settle(self.kind, self.write(|c| c.update_one(model)).await)
    }

    async fn remove(&self, models: Vec<T>) -> Outcome<Vec<T>> {
        settle(self.kind, self.write(|c| Ok(c.remove(models))).await)
    }

    async fn store_or_update(&self, models: Vec<T>) -> Outcome<Vec<T>> {
        settle(self.kind, self.write(|c| Ok(c.upsert(models))).await)
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
pub(crate) async fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .await
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .await
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| StorageError::AtomicWriteFailed {
            from: temp_path,
            to: path.to_path_buf(),
            source: e,
        })?;

    Ok(())
}
