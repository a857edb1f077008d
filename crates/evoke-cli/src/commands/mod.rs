//! Command handlers

pub mod car;
pub mod config;
pub mod status;
pub mod strategy;

use anyhow::Result;

use evoke_core::Outcome;

/// Turn a failed outcome into a command error
///
/// Any data the outcome carries has already been printed by then.
pub fn ensure_ok<D>(outcome: &Outcome<D>) -> Result<()> {
    match &outcome.error {
        Some(error) => Err(anyhow::Error::new(error.clone())),
        None => Ok(()),
    }
}
