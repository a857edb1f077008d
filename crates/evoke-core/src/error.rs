//! Error types
//!
//! [`Error`] is what a dispatch reports through an [`Outcome`](crate::Outcome):
//! configuration problems found while routing, or an opaque failure reported
//! by a repository. [`StrategyError`] is raised while building a policy, so an
//! invalid strategy never reaches a proxy.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

use crate::strategy::{Action, StoreKind};

/// Errors delivered by a dispatch
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// No proxy has been registered for the model
    #[error("No proxy registered for model '{model}'")]
    ProxyNotFound { model: &'static str },

    /// The model's strategy has no rule for the action
    #[error("No rule defined for action '{action}' on model '{model}'")]
    RulesNotDefined {
        action: Action,
        model: &'static str,
    },

    /// A repository the rule needs was never attached to the proxy
    #[error("Missing {kind} repository for model '{model}'")]
    MissingRepository {
        kind: StoreKind,
        model: &'static str,
    },

    /// Failure reported by a repository implementation
    #[error("Repository error: {0}")]
    Repository(#[source] Arc<dyn StdError + Send + Sync>),
}

impl Error {
    /// Wrap a repository-specific error
    pub fn repository<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error::Repository(Arc::new(error))
    }

    /// Whether the error comes from routing configuration rather than a store
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Error::Repository(_))
    }

    /// Downcast a repository error to its concrete type
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            Error::Repository(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Errors raised while building a [`Rule`](crate::Rule) or
/// [`Strategy`](crate::Strategy)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// The fallback store is the target store
    #[error("Invalid rule: {target} cannot fall back to itself")]
    InvalidRule { target: StoreKind },

    /// Some actions have no rule
    #[error("Incomplete strategy: no rule for {}", join_actions(.missing))]
    IncompleteConfiguration { missing: Vec<Action> },
}

fn join_actions(actions: &[Action]) -> String {
    actions
        .iter()
        .map(|action| action.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
