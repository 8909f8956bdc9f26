//! # Reconcile Command Implementation
//!
//! This module implements the `reconcile` subcommand, which refreshes the
//! frozen definition of every installed addon whose catalog entry still
//! carries the installed version. This picks up corrections that shipped
//! without a version bump.

use anyhow::Result;
use clap::Args;

use addon_store::addons::AddonStore;

/// Pick up definition changes that shipped without a version bump
#[derive(Args, Debug)]
pub struct ReconcileArgs {}

/// Execute the `reconcile` command.
pub fn execute(_args: ReconcileArgs, store: &mut AddonStore) -> Result<()> {
    if store.reconcile_auto_updates()? {
        println!("✅ Refreshed installed definitions");
    } else {
        println!("Installed definitions are current.");
    }
    Ok(())
}
