//! Model registry
//!
//! The [`Registry`] maps each model type to its [`Proxy`]. It is an ordinary
//! value: create it once at startup, register and configure every model, then
//! share it (for example behind an `Arc`) with whatever dispatches calls.
//!
//! Registration needs `&mut Registry` and dispatch needs `&Registry`, so a
//! registry cannot be reconfigured while calls are in flight.
//!
//! ## Usage
//!
//! ```ignore
//! let mut registry = Registry::new();
//! registry
//!     .register::<Car>()
//!     .with_remote(api)
//!     .with_local(cache)
//!     .with_strategy(strategy);
//!
//! let cars = registry.find::<Car>(Criteria::new().with("year", 2002)).await;
//! ```

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info};

use crate::proxy::Proxy;

/// Types that can be routed through a [`Registry`]
pub trait Model: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Model for T {}

struct Entry {
    model: &'static str,
    proxy: Box<dyn Any + Send + Sync>,
}

/// Lookup from model type to its proxy
#[derive(Default)]
pub struct Registry {
    proxies: HashMap<TypeId, Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model and return its proxy for configuration
    ///
    /// Registering a model again replaces its previous proxy, repositories
    /// and strategy included.
    pub fn register<T: Model>(&mut self) -> &mut Proxy<T> {
        let model = type_name::<T>();
        let entry = Entry {
            model,
            proxy: Box::new(Proxy::<T>::default()),
        };

        if self.proxies.insert(TypeId::of::<T>(), entry).is_some() {
            info!("Replaced proxy for {}", model);
        } else {
            debug!("Registered proxy for {}", model);
        }

        self.proxy_mut::<T>()
            .expect("entry keyed by TypeId::of::<T>() always holds a Proxy<T>")
    }

    /// Proxy of a registered model
    pub fn proxy<T: Model>(&self) -> Option<&Proxy<T>> {
        self.proxies
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.proxy.downcast_ref::<Proxy<T>>())
    }

    /// Mutable proxy of a registered model, for later reconfiguration
    pub fn proxy_mut<T: Model>(&mut self) -> Option<&mut Proxy<T>> {
        self.proxies
            .get_mut(&TypeId::of::<T>())
            .and_then(|entry| entry.proxy.downcast_mut::<Proxy<T>>())
    }

    pub fn is_registered<T: Model>(&self) -> bool {
        self.proxies.contains_key(&TypeId::of::<T>())
    }

    /// Names of the registered models
    pub fn models(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.proxies.values().map(|entry| entry.model)
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut models: Vec<_> = self.models().collect();
        models.sort_unstable();
        f.debug_struct("Registry").field("models", &models).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{Rule, StoreKind, Strategy};
    use crate::test_support::{Car, RecordingRepository};

    #[derive(Clone)]
    struct Driver;

    #[test]
    fn test_register_creates_default_proxy() {
        let mut registry = Registry::new();
        assert!(!registry.is_registered::<Car>());

        registry.register::<Car>();

        assert!(registry.is_registered::<Car>());
        assert!(!registry.is_registered::<Driver>());
        let proxy = registry.proxy::<Car>().unwrap();
        assert_eq!(proxy.strategy(), &Strategy::default());
        assert!(proxy.local().is_none());
    }

    #[test]
    fn test_models_are_kept_apart() {
        let mut registry = Registry::new();
        registry
            .register::<Car>()
            .with_local(RecordingRepository::new(StoreKind::Local));
        registry.register::<Driver>();

        assert_eq!(registry.len(), 2);
        assert!(registry.proxy::<Car>().unwrap().local().is_some());
        assert!(registry.proxy::<Driver>().unwrap().local().is_none());
        assert!(registry.models().any(|name| name.ends_with("Car")));
    }

    #[test]
    fn test_register_again_replaces_proxy() {
        let mut registry = Registry::new();
        registry
            .register::<Car>()
            .with_local(RecordingRepository::new(StoreKind::Local))
            .with_strategy(Strategy::uniform(Rule::target(StoreKind::Local)));

        registry.register::<Car>();

        assert_eq!(registry.len(), 1);
        let proxy = registry.proxy::<Car>().unwrap();
        assert!(proxy.local().is_none());
        assert_eq!(proxy.strategy(), &Strategy::default());
    }

    #[test]
    fn test_proxy_mut_reconfigures() {
        let mut registry = Registry::new();
        registry.register::<Car>();

        registry
            .proxy_mut::<Car>()
            .unwrap()
            .with_remote(RecordingRepository::new(StoreKind::Remote));

        assert!(registry.proxy::<Car>().unwrap().remote().is_some());
        assert!(registry.proxy_mut::<Driver>().is_none());
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
