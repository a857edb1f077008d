//! Routing algorithm
//!
//! Every action goes through the same routine:
//!
//! 1. resolve the model's proxy, the rule for the action, and the target
//!    repository (any gap ends the call with an error and no store is touched)
//! 2. invoke the target
//! 3. on failure, invoke the fallback store once with the same payload
//! 4. on success with data, and when the rule asks for it, propagate the data
//!    to the other store
//!
//! Steps never overlap: a call runs target, then either fallback or
//! synchronization, never both. Each store's raw outcome is recorded in the
//! delivered outcome's metadata under [`RAW_KEY`](crate::RAW_KEY).
//!
//! Removal is the exception to step 4: when synchronization is enabled, the
//! models the caller asked to remove are removed from the other store as
//! well, whatever the target returned.

use std::any::type_name;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tracing::{debug, warn};

use crate::criteria::Criteria;
use crate::error::Error;
use crate::outcome::Outcome;
use crate::registry::{Model, Registry};
use crate::repository::{AnyRepository, Repository};
use crate::strategy::{Action, Rule, StoreKind};

/// Everything a call needs, copied out of the proxy
struct Route<T> {
    model: &'static str,
    rule: Rule,
    local: Option<AnyRepository<T>>,
    remote: Option<AnyRepository<T>>,
}

impl<T> Route<T> {
    fn repository(&self, kind: StoreKind) -> Result<AnyRepository<T>, Error> {
        let repository = match kind {
            StoreKind::Local => self.local.as_ref(),
            StoreKind::Remote => self.remote.as_ref(),
        };
        repository.cloned().ok_or(Error::MissingRepository {
            kind,
            model: self.model,
        })
    }
}

impl Registry {
    /// Fetch all models matching the criteria
    pub async fn find<T: Model>(&self, criteria: Criteria) -> Outcome<Vec<T>> {
        self.dispatch(
            Action::Find,
            move |repository: AnyRepository<T>| {
                let criteria = criteria.clone();
                async move { repository.find(&criteria).await }.boxed()
            },
            collection_payload,
            store_or_update,
        )
        .await
    }

    /// Fetch the first model matching the criteria
    pub async fn find_one<T: Model>(&self, criteria: Criteria) -> Outcome<T> {
        self.dispatch(
            Action::FindOne,
            move |repository: AnyRepository<T>| {
                let criteria = criteria.clone();
                async move { repository.find_one(&criteria).await }.boxed()
            },
            single_payload,
            store_or_update,
        )
        .await
    }

    /// Create a collection of models
    pub async fn store<T: Model>(&self, models: Vec<T>) -> Outcome<Vec<T>> {
        self.dispatch(
            Action::Store,
            move |repository: AnyRepository<T>| {
                let models = models.clone();
                async move { repository.store(models).await }.boxed()
            },
            collection_payload,
            store_or_update,
        )
        .await
    }

    /// Create a model
    pub async fn store_one<T: Model>(&self, model: T) -> Outcome<T> {
        self.dispatch(
            Action::StoreOne,
            move |repository: AnyRepository<T>| {
                let model = model.clone();
                async move { repository.store_one(model).await }.boxed()
            },
            single_payload,
            store_or_update,
        )
        .await
    }

    /// Update a collection of models
    pub async fn update<T: Model>(&self, models: Vec<T>) -> Outcome<Vec<T>> {
        self.dispatch(
            Action::Update,
            move |repository: AnyRepository<T>| {
                let models = models.clone();
                async move { repository.update(models).await }.boxed()
            },
            collection_payload,
            store_or_update,
        )
        .await
    }

    /// Update a model
    pub async fn update_one<T: Model>(&self, model: T) -> Outcome<T> {
        self.dispatch(
            Action::UpdateOne,
            move |repository: AnyRepository<T>| {
                let model = model.clone();
                async move { repository.update_one(model).await }.boxed()
            },
            single_payload,
            store_or_update,
        )
        .await
    }

    /// Delete a collection of models
    pub async fn remove<T: Model>(&self, models: Vec<T>) -> Outcome<Vec<T>> {
        let input = models.clone();
        self.dispatch(
            Action::Remove,
            move |repository: AnyRepository<T>| {
                let models = models.clone();
                async move { repository.remove(models).await }.boxed()
            },
            move |_: &Outcome<Vec<T>>| Some(input),
            remove,
        )
        .await
    }

    /// Delete a model
    ///
    /// Routed with the `remove_one` rule; stores receive a one-element
    /// `remove` call and the first removed model is returned.
    pub async fn remove_one<T: Model>(&self, model: T) -> Outcome<T> {
        let input = vec![model.clone()];
        self.dispatch(
            Action::RemoveOne,
            move |repository: AnyRepository<T>| {
                let models = vec![model.clone()];
                async move {
                    repository
                        .remove(models)
                        .await
                        .map(|removed| removed.into_iter().next())
                }
                .boxed()
            },
            move |_: &Outcome<T>| Some(input),
            remove,
        )
        .await
    }

    fn route<T: Model>(&self, action: Action) -> Result<Route<T>, Error> {
        let model = type_name::<T>();
        let proxy = self.proxy::<T>().ok_or(Error::ProxyNotFound { model })?;
        let rule = proxy
            .strategy()
            .rule(action)
            .copied()
            .ok_or(Error::RulesNotDefined { action, model })?;

        Ok(Route {
            model,
            rule,
            local: proxy.local().cloned(),
            remote: proxy.remote().cloned(),
        })
    }

    /// Run one action through its rule
    ///
    /// `invoke` calls the action on a repository and serves both the target
    /// and the fallback. `sync_payload` picks the models to propagate after a
    /// successful target call, or `None` when there is nothing to propagate.
    /// `sync` propagates them to the other store.
    async fn dispatch<T, D, I, P, S>(
        &self,
        action: Action,
        invoke: I,
        sync_payload: P,
        sync: S,
    ) -> Outcome<D>
    where
        T: Model,
        D: Clone + Send + Sync + 'static,
        I: Fn(AnyRepository<T>) -> BoxFuture<'static, Outcome<D>> + Send,
        P: FnOnce(&Outcome<D>) -> Option<Vec<T>> + Send,
        S: FnOnce(AnyRepository<T>, Vec<T>) -> BoxFuture<'static, Outcome<Vec<T>>> + Send,
    {
        let route = match self.route::<T>(action) {
            Ok(route) => route,
            Err(error) => {
                warn!("Cannot dispatch {}: {}", action, error);
                return Outcome::from_error(error);
            }
        };
        let rule = route.rule;

        let target = match route.repository(rule.target_kind()) {
            Ok(target) => target,
            Err(error) => {
                warn!("Cannot dispatch {}: {}", action, error);
                return Outcome::from_error(error);
            }
        };

        debug!("{} {} on {}", route.model, action, rule);
        let mut outcome = invoke(target).await;
        let raw = outcome.snapshot();
        outcome.metadata.set_raw(rule.target_kind(), raw);

        if let Some(error) = &outcome.error {
            debug!(
                "{} {} failed on {}: {}",
                route.model,
                action,
                rule.target_kind(),
                error
            );

            let Some(fallback_kind) = rule.fallback() else {
                return outcome;
            };

            let fallback = match route.repository(fallback_kind) {
                Ok(fallback) => fallback,
                Err(error) => {
                    warn!("Cannot fall back for {}: {}", action, error);
                    outcome.error = Some(error);
                    return outcome;
                }
            };

            debug!("{} {} falling back to {}", route.model, action, fallback_kind);
            let trail = outcome.metadata.take(rule.target_kind());
            let mut fallback_outcome = invoke(fallback).await;
            fallback_outcome.metadata.replace(rule.target_kind(), trail);
            return fallback_outcome;
        }

        if !rule.synchronize() {
            return outcome;
        }

        let Some(models) = sync_payload(&outcome) else {
            debug!("{} {} returned no data to synchronize", route.model, action);
            return outcome;
        };

        let needed = rule.target_kind().opposite();
        let repository = match route.repository(needed) {
            Ok(repository) => repository,
            Err(error) => {
                warn!("Cannot synchronize {}: {}", action, error);
                outcome.error = Some(error);
                return outcome;
            }
        };

        debug!(
            "{} {} synchronizing {} model(s) to {}",
            route.model,
            action,
            models.len(),
            needed
        );
        let synced = sync(repository, models).await;
        if let Some(error) = &synced.error {
            warn!("Synchronizing {} to {} failed: {}", action, needed, error);
        }
        outcome.metadata.set_raw(needed, synced.snapshot());
        outcome.error = synced.error;
        outcome
    }
}

/// Propagate a non-empty collection
fn collection_payload<T: Clone>(outcome: &Outcome<Vec<T>>) -> Option<Vec<T>> {
    outcome
        .data
        .as_ref()
        .filter(|models| !models.is_empty())
        .cloned()
}

/// Propagate a single model as a one-element collection
fn single_payload<T: Clone>(outcome: &Outcome<T>) -> Option<Vec<T>> {
    outcome.data.as_ref().map(|model| vec![model.clone()])
}

fn store_or_update<T: Model>(
    repository: AnyRepository<T>,
    models: Vec<T>,
) -> BoxFuture<'static, Outcome<Vec<T>>> {
    async move { repository.store_or_update(models).await }.boxed()
}

fn remove<T: Model>(
    repository: AnyRepository<T>,
    models: Vec<T>,
) -> BoxFuture<'static, Outcome<Vec<T>>> {
    async move { repository.remove(models).await }.boxed()
}
