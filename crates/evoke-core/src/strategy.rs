//! Routing policy
//!
//! A [`Strategy`] maps every [`Action`] to a [`Rule`] that says which store to
//! try first, which store to fall back to, and whether a successful result is
//! propagated to the other store.
//!
//! Both types are validated when built, including when deserialized from a
//! configuration file, so an invalid policy can never reach a `Proxy`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StrategyError;

/// Which physical store a repository represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Secondary store on the device (cache, disk, embedded database)
    Local,
    /// Source of record (network service)
    Remote,
}

impl StoreKind {
    /// Both store kinds, local first
    pub const ALL: [StoreKind; 2] = [StoreKind::Local, StoreKind::Remote];

    /// The other store
    pub fn opposite(self) -> Self {
        match self {
            StoreKind::Local => StoreKind::Remote,
            StoreKind::Remote => StoreKind::Local,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StoreKind::Local => "local",
            StoreKind::Remote => "remote",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A CRUD operation that can be routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Find,
    FindOne,
    Store,
    StoreOne,
    Update,
    UpdateOne,
    Remove,
    RemoveOne,
}

impl Action {
    /// Every action, in declaration order
    pub const ALL: [Action; 8] = [
        Action::Find,
        Action::FindOne,
        Action::Store,
        Action::StoreOne,
        Action::Update,
        Action::UpdateOne,
        Action::Remove,
        Action::RemoveOne,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Find => "find",
            Action::FindOne => "find_one",
            Action::Store => "store",
            Action::StoreOne => "store_one",
            Action::Update => "update",
            Action::UpdateOne => "update_one",
            Action::Remove => "remove",
            Action::RemoveOne => "remove_one",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing policy for a single action
///
/// The fallback store can never be the target store: falling back to the
/// store that just failed would loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleRepr", into = "RuleRepr")]
pub struct Rule {
    target: StoreKind,
    fallback: Option<StoreKind>,
    synchronize: bool,
}

impl Rule {
    /// Create a validated rule
    pub fn new(
        target: StoreKind,
        fallback: Option<StoreKind>,
        synchronize: bool,
    ) -> Result<Self, StrategyError> {
        if fallback == Some(target) {
            return Err(StrategyError::InvalidRule { target });
        }

        Ok(Self {
            target,
            fallback,
            synchronize,
        })
    }

    /// A rule that only uses `target`: no fallback, no synchronization
    pub fn target(target: StoreKind) -> Self {
        Self {
            target,
            fallback: None,
            synchronize: false,
        }
    }

    /// A rule that uses `target` and falls back to the other store
    pub fn target_or_opposite(target: StoreKind) -> Self {
        Self {
            target,
            fallback: Some(target.opposite()),
            synchronize: false,
        }
    }

    /// Set the fallback store
    pub fn with_fallback(self, fallback: StoreKind) -> Result<Self, StrategyError> {
        Self::new(self.target, Some(fallback), self.synchronize)
    }

    /// Enable or disable synchronization
    pub fn synchronized(mut self, synchronize: bool) -> Self {
        self.synchronize = synchronize;
        self
    }

    pub fn target_kind(&self) -> StoreKind {
        self.target
    }

    pub fn fallback(&self) -> Option<StoreKind> {
        self.fallback
    }

    pub fn synchronize(&self) -> bool {
        self.synchronize
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target)?;
        if let Some(fallback) = self.fallback {
            write!(f, " -> {}", fallback)?;
        }
        if self.synchronize {
            write!(f, " (sync {})", self.target.opposite())?;
        }
        Ok(())
    }
}

/// Serialized form of a [`Rule`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RuleRepr {
    target: StoreKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fallback: Option<StoreKind>,
    #[serde(default)]
    synchronize: bool,
}

impl TryFrom<RuleRepr> for Rule {
    type Error = StrategyError;

    fn try_from(repr: RuleRepr) -> Result<Self, Self::Error> {
        Rule::new(repr.target, repr.fallback, repr.synchronize)
    }
}

impl From<Rule> for RuleRepr {
    fn from(rule: Rule) -> Self {
        Self {
            target: rule.target,
            fallback: rule.fallback,
            synchronize: rule.synchronize,
        }
    }
}

/// Complete routing policy for one model
///
/// A strategy always defines a rule for every [`Action`]; partial policies
/// are rejected instead of silently defaulting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Action, Rule>", into = "BTreeMap<Action, Rule>")]
pub struct Strategy {
    rules: BTreeMap<Action, Rule>,
}

impl Strategy {
    /// Build a strategy from a complete set of rules
    pub fn new(rules: impl IntoIterator<Item = (Action, Rule)>) -> Result<Self, StrategyError> {
        let rules: BTreeMap<Action, Rule> = rules.into_iter().collect();

        let missing: Vec<Action> = Action::ALL
            .into_iter()
            .filter(|action| !rules.contains_key(action))
            .collect();
        if !missing.is_empty() {
            return Err(StrategyError::IncompleteConfiguration { missing });
        }

        Ok(Self { rules })
    }

    /// Apply the same rule to every action
    pub fn uniform(rule: Rule) -> Self {
        Self {
            rules: Action::ALL.into_iter().map(|action| (action, rule)).collect(),
        }
    }

    /// Rule for an action
    pub fn rule(&self, action: Action) -> Option<&Rule> {
        self.rules.get(&action)
    }

    /// All rules, in action order
    pub fn rules(&self) -> impl Iterator<Item = (Action, &Rule)> {
        self.rules.iter().map(|(action, rule)| (*action, rule))
    }
}

impl Default for Strategy {
    /// Reads and removals hit the remote store first and fall back to the
    /// local one; other writes hit the local store first and fall back to the
    /// remote one. Nothing is synchronized.
    fn default() -> Self {
        let remote_first = Rule::target_or_opposite(StoreKind::Remote);
        let local_first = Rule::target_or_opposite(StoreKind::Local);

        let rules = Action::ALL.into_iter().map(|action| {
            let rule = match action {
                Action::Find | Action::FindOne | Action::Remove | Action::RemoveOne => {
                    remote_first
                }
                Action::Store | Action::StoreOne | Action::Update | Action::UpdateOne => {
                    local_first
                }
            };
            (action, rule)
        });

        Self {
            rules: rules.collect(),
        }
    }
}

impl TryFrom<BTreeMap<Action, Rule>> for Strategy {
    type Error = StrategyError;

    fn try_from(rules: BTreeMap<Action, Rule>) -> Result<Self, Self::Error> {
        Strategy::new(rules)
    }
}

impl From<Strategy> for BTreeMap<Action, Rule> {
    fn from(strategy: Strategy) -> Self {
        strategy.rules
    }
}
