//! Strategy command handler

use anyhow::Result;

use crate::output::Output;
use crate::stores::Stores;

/// Show the effective car strategy
pub fn show(stores: &Stores, output: &Output) -> Result<()> {
    output.print_strategy(&stores.strategy, stores.configured);
    Ok(())
}
