//! In-memory repository

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::criteria::Criteria;
use crate::outcome::Outcome;
use crate::repository::Repository;
use crate::storage::collection::Collection;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::{settle, settle_optional, Record};
use crate::strategy::StoreKind;

/// Repository holding its records in memory
///
/// Every outcome it produces carries `kind` as its origin.
pub struct MemoryRepository<T> {
    kind: StoreKind,
    records: RwLock<Collection<T>>,
    available: AtomicBool,
}

impl<T: Record> MemoryRepository<T> {
    pub fn new(kind: StoreKind) -> Self {
        Self::with_records(kind, Vec::new())
    }

    /// Create a repository seeded with records
    pub fn with_records(kind: StoreKind, records: Vec<T>) -> Self {
        Self {
            kind,
            records: RwLock::new(Collection::from_records(records)),
            available: AtomicBool::new(true),
        }
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    /// Switch the store on or off
    pub fn set_available(&self, available: bool) {
        debug!("{} memory store available: {}", self.kind, available);
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Copy of every record, regardless of availability
    pub async fn records(&self) -> Vec<T> {
        self.records.read().await.records().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
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
        Ok(f(&*self.records.read().await))
    }

    async fn write<D>(
        &self,
        f: impl FnOnce(&mut Collection<T>) -> StorageResult<D>,
    ) -> StorageResult<D> {
        self.check_available()?;
        f(&mut *self.records.write().await)
    }
}

#[async_trait]
impl<T: Record> Repository<T> for MemoryRepository<T> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{catalogue, Car};

    #[tokio::test]
    async fn test_find_tags_origin() {
        let repository = MemoryRepository::with_records(StoreKind::Remote, catalogue());

        let outcome = repository
            .find(&Criteria::new().with("year", 2002))
            .await;

        assert!(outcome.is_ok());
        assert_eq!(outcome.origin, Some(StoreKind::Remote));
        assert_eq!(outcome.data.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_one_without_match_is_empty() {
        let repository = MemoryRepository::with_records(StoreKind::Local, catalogue());

        let outcome = repository
            .find_one(&Criteria::new().with("id", "404"))
            .await;

        assert!(outcome.is_ok());
        assert!(outcome.data.is_none());
    }

    #[tokio::test]
    async fn test_store_one_conflict() {
        let repository = MemoryRepository::with_records(StoreKind::Local, catalogue());

        let outcome = repository
            .store_one(Car::new("001", "Peugeot 508", 2011))
            .await;

        assert!(outcome.is_err());
        assert!(matches!(
            outcome.error.unwrap().downcast_ref::<StorageError>(),
            Some(StorageError::Conflict { .. })
        ));
        assert_eq!(repository.len().await, 4);
    }

    #[tokio::test]
    async fn test_writes_change_contents() {
        let repository = MemoryRepository::<Car>::new(StoreKind::Local);

        repository.store(catalogue()).await;
        repository
            .update_one(Car::new("002", "Jaguar XJ", 1998))
            .await;
        let removed = repository
            .remove(vec![Car::new("006", "BMW M3", 2002)])
            .await;
        repository
            .store_or_update(vec![Car::new("007", "Aston Martin", 1964)])
            .await;

        assert_eq!(removed.data.unwrap().len(), 1);
        let models: Vec<String> = repository
            .records()
            .await
            .into_iter()
            .map(|car| car.model)
            .collect();
        assert_eq!(
            models,
            vec!["Peugeot 508", "Jaguar XJ", "Mazda", "Aston Martin"]
        );
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let repository = MemoryRepository::with_records(StoreKind::Remote, catalogue());
        repository.set_available(false);

        let found = repository.find(&Criteria::new()).await;
        let synced = repository.store_or_update(catalogue()).await;

        for error in [found.error, synced.error] {
            assert!(matches!(
                error.unwrap().downcast_ref::<StorageError>(),
                Some(StorageError::Unavailable {
                    kind: StoreKind::Remote
                })
            ));
        }
        assert_eq!(found.origin, Some(StoreKind::Remote));

        repository.set_available(true);
        assert!(repository.find(&Criteria::new()).await.is_ok());
    }
}
