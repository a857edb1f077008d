//! Store setup
//!
//! Both sides of the car model are JSON files under the data directory:
//! `local/car.json` stands in for an on-device cache and `remote/car.json`
//! for a server. Running offline switches the remote store off so every
//! call that targets it fails and the strategy's fallback takes over.
//!
//! Without a configured car strategy the local store answers every call.
//! Online, each call also mirrors its result into the remote store.

use std::sync::Arc;

use tracing::{debug, info};

use evoke_core::{Config, JsonFileRepository, Registry, Rule, StoreKind, Strategy};

use crate::models::{Car, CAR};

/// Registry plus direct handles to the car stores
pub struct Stores {
    pub registry: Registry,
    pub local: Arc<JsonFileRepository<Car>>,
    pub remote: Arc<JsonFileRepository<Car>>,
    pub strategy: Strategy,
    /// Whether the strategy comes from the config file
    pub configured: bool,
}

impl Stores {
    /// Register the car model with its stores and strategy
    pub fn open(config: &Config, offline: bool) -> Self {
        let local = Arc::new(JsonFileRepository::new(
            StoreKind::Local,
            config.local_store_path(CAR),
        ));
        let remote = Arc::new(JsonFileRepository::new(
            StoreKind::Remote,
            config.remote_store_path(CAR),
        ));
        let configured = config.strategies.contains_key(CAR);
        let strategy = if configured {
            config.strategy_for(CAR)
        } else {
            default_car_strategy(offline)
        };

        if offline {
            info!("Offline: remote store disabled");
            remote.set_available(false);
        }

        let mut registry = Registry::new();
        registry
            .register::<Car>()
            .with_local(Arc::clone(&local))
            .with_remote(Arc::clone(&remote))
            .with_strategy(strategy.clone());

        debug!(
            "Opened car stores at {:?} and {:?}",
            local.path(),
            remote.path()
        );

        Self {
            registry,
            local,
            remote,
            strategy,
            configured,
        }
    }

    /// Whether the remote store is switched off
    pub fn offline(&self) -> bool {
        !self.remote.is_available()
    }

    pub fn store(&self, kind: StoreKind) -> &JsonFileRepository<Car> {
        match kind {
            StoreKind::Local => &self.local,
            StoreKind::Remote => &self.remote,
        }
    }
}

/// Local first with remote fallback, synchronized unless offline
fn default_car_strategy(offline: bool) -> Strategy {
    Strategy::uniform(Rule::target_or_opposite(StoreKind::Local).synchronized(!offline))
}
