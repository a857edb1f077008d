//! Evoke Core Library
//!
//! This crate routes data operations between a local and a remote
//! repository. Each model type gets a per-action routing rule: which store to
//! try first, which store to fall back to when that fails, and whether a
//! successful result should be copied into the other store.
//!
//! # Architecture
//!
//! - **Registry**: maps each model type to its proxy (main entry point)
//! - **Proxy**: the local and remote repositories of a model, plus its strategy
//! - **Strategy**: one rule per action (target, fallback, synchronize)
//! - **Outcome**: the envelope every call completes with, including a trail
//!   of the raw result each store produced
//!
//! # Quick Start
//!
//! ```text
//! let mut registry = Registry::new();
//! registry
//!     .register::<Car>()
//!     .with_remote(JsonFileRepository::new(StoreKind::Remote, "remote/car.json"))
//!     .with_local(MemoryRepository::new(StoreKind::Local))
//!     .with_strategy(Strategy::uniform(
//!         Rule::new(StoreKind::Remote, Some(StoreKind::Local), true)?,
//!     ));
//!
//! // Served by the remote, mirrored into the local cache
//! let cars = registry.find::<Car>(Criteria::new().with("year", 2002)).await;
//! ```
//!
//! # Modules
//!
//! - `registry`: model registration and the dispatch entry points
//! - `proxy`: per-model repositories and strategy
//! - `strategy`: actions, rules and strategies
//! - `repository`: the repository capability and its type-erased handle
//! - `outcome`: result envelope and metadata trail
//! - `criteria`: query filters
//! - `storage`: bundled memory and JSON file repositories
//! - `config`: application configuration

pub mod config;
pub mod criteria;
mod dispatch;
pub mod error;
pub mod outcome;
pub mod proxy;
pub mod registry;
pub mod repository;
pub mod storage;
pub mod strategy;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use criteria::Criteria;
pub use error::{Error, StrategyError};
pub use outcome::{Metadata, Outcome, Snapshot, RAW_KEY};
pub use proxy::Proxy;
pub use registry::{Model, Registry};
pub use repository::{AnyRepository, Repository};
pub use storage::{
    Collection, JsonFileRepository, MemoryRepository, Record, StorageError, StorageResult,
};
pub use strategy::{Action, Rule, StoreKind, Strategy};
