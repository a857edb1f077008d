//! Per-model binding
//!
//! A [`Proxy`] holds the local and remote repositories of one model together
//! with the [`Strategy`] that routes calls between them. Either repository may
//! be missing until it is attached; the router reports the gap when a rule
//! needs it.

use crate::repository::{AnyRepository, Repository};
use crate::strategy::{StoreKind, Strategy};

/// Repositories and routing policy for one model
#[derive(Debug)]
pub struct Proxy<T> {
    strategy: Strategy,
    local: Option<AnyRepository<T>>,
    remote: Option<AnyRepository<T>>,
}

impl<T> Default for Proxy<T> {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

impl<T> Proxy<T> {
    /// Create a proxy with no repositories
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            local: None,
            remote: None,
        }
    }

    /// Replace the routing policy
    pub fn with_strategy(&mut self, strategy: Strategy) -> &mut Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn local(&self) -> Option<&AnyRepository<T>> {
        self.local.as_ref()
    }

    pub fn remote(&self) -> Option<&AnyRepository<T>> {
        self.remote.as_ref()
    }

    /// Repository attached for a store kind
    pub fn repository(&self, kind: StoreKind) -> Option<&AnyRepository<T>> {
        match kind {
            StoreKind::Local => self.local.as_ref(),
            StoreKind::Remote => self.remote.as_ref(),
        }
    }

    /// Detach a repository
    pub fn without_repository(&mut self, kind: StoreKind) -> &mut Self {
        match kind {
            StoreKind::Local => self.local = None,
            StoreKind::Remote => self.remote = None,
        }
        self
    }
}

impl<T: Send + 'static> Proxy<T> {
    /// Attach the local repository
    pub fn with_local<R>(&mut self, repository: R) -> &mut Self
    where
        R: Repository<T> + 'static,
    {
        self.with_repository(StoreKind::Local, AnyRepository::new(repository))
    }

    /// Attach the remote repository
    pub fn with_remote<R>(&mut self, repository: R) -> &mut Self
    where
        R: Repository<T> + 'static,
    {
        self.with_repository(StoreKind::Remote, AnyRepository::new(repository))
    }

    /// Attach an already erased repository for a store kind
    pub fn with_repository(&mut self, kind: StoreKind, repository: AnyRepository<T>) -> &mut Self {
        match kind {
            StoreKind::Local => self.local = Some(repository),
            StoreKind::Remote => self.remote = Some(repository),
        }
        self
    }
}
