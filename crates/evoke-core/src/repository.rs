//! Repository capability
//!
//! A [`Repository`] is any store that can hold a model: a network client, a
//! disk cache, an in-memory double. Each operation is a single async call that
//! completes exactly once with an [`Outcome`].
//!
//! `store_or_update` is never called by application code through the router;
//! it exists so that results can be synchronized into the other store.
//!
//! [`AnyRepository`] erases the concrete type so a proxy can hold any pair of
//! stores chosen at registration time.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::criteria::Criteria;
use crate::outcome::Outcome;

/// The operations a store must provide for a model
#[async_trait]
pub trait Repository<T>: Send + Sync {
    /// All models matching the criteria
    async fn find(&self, criteria: &Criteria) -> Outcome<Vec<T>>;

    /// The first model matching the criteria
    async fn find_one(&self, criteria: &Criteria) -> Outcome<T>;

    /// Create a collection of models
    async fn store(&self, models: Vec<T>) -> Outcome<Vec<T>>;

    /// Create a model
    async fn store_one(&self, model: T) -> Outcome<T>;

    /// Update a collection of models
    async fn update(&self, models: Vec<T>) -> Outcome<Vec<T>>;

    /// Update a model
    async fn update_one(&self, model: T) -> Outcome<T>;

    /// Delete a collection of models
    async fn remove(&self, models: Vec<T>) -> Outcome<Vec<T>>;

    /// Create or update each model, used for synchronization
    async fn store_or_update(&self, models: Vec<T>) -> Outcome<Vec<T>>;
}

#[async_trait]
impl<T, R> Repository<T> for Arc<R>
where
    T: Send + 'static,
    R: Repository<T> + ?Sized,
{
    async fn find(&self, criteria: &Criteria) -> Outcome<Vec<T>> {
        (**self).find(criteria).await
    }

    async fn find_one(&self, criteria: &Criteria) -> Outcome<T> {
        (**self).find_one(criteria).await
    }

    async fn store(&self, models: Vec<T>) -> Outcome<Vec<T>> {
        (**self).store(models).await
    }

    async fn store_one(&self, model: T) -> Outcome<T> {
        (**self).store_one(model).await
    }

    async fn update(&self, models: Vec<T>) -> Outcome<Vec<T>> {
        (**self).update(models).await
    }

    async fn update_one(&self, model: T) -> Outcome<T> {
        (**self).update_one(model).await
    }

    async fn remove(&self, models: Vec<T>) -> Outcome<Vec<T>> {
        (**self).remove(models).await
    }

    async fn store_or_update(&self, models: Vec<T>) -> Outcome<Vec<T>> {
        (**self).store_or_update(models).await
    }
}

/// Type-erased, cheaply cloneable repository handle
pub struct AnyRepository<T> {
    inner: Arc<dyn Repository<T>>,
}

impl<T: Send + 'static> AnyRepository<T> {
    /// Erase a concrete repository
    pub fn new<R>(repository: R) -> Self
    where
        R: Repository<T> + 'static,
    {
        Self {
            inner: Arc::new(repository),
        }
    }

    /// Share an already reference-counted repository
    pub fn from_arc(repository: Arc<dyn Repository<T>>) -> Self {
        Self { inner: repository }
    }

    /// Whether two handles point at the same repository
    pub fn same_as(&self, other: &AnyRepository<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for AnyRepository<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for AnyRepository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyRepository").finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: Send + 'static> Repository<T> for AnyRepository<T> {
    async fn find(&self, criteria: &Criteria) -> Outcome<Vec<T>> {
        self.inner.find(criteria).await
    }

    async fn find_one(&self, criteria: &Criteria) -> Outcome<T> {
        self.inner.find_one(criteria).await
    }

    async fn store(&self, models: Vec<T>) -> Outcome<Vec<T>> {
        self.inner.store(models).await
    }

    async fn store_one(&self, model: T) -> Outcome<T> {
        self.inner.store_one(model).await
    }

    async fn update(&self, models: Vec<T>) -> Outcome<Vec<T>> {
        self.inner.update(models).await
    }

    async fn update_one(&self, model: T) -> Outcome<T> {
        self.inner.update_one(model).await
    }

    async fn remove(&self, models: Vec<T>) -> Outcome<Vec<T>> {
        self.inner.remove(models).await
    }

    async fn store_or_update(&self, models: Vec<T>) -> Outcome<Vec<T>> {
        self.inner.store_or_update(models).await
    }
}
