//! # Boot Command Implementations
//!
//! This module implements the `boot-set` and `boot` subcommands. `boot-set`
//! prints the installed addons that start automatically at one startup
//! stage, which is what a supervisor iterates over at boot. `boot` overrides
//! the boot policy of one installed addon.

use anyhow::Result;
use clap::Args;

use addon_store::addons::AddonStore;
use addon_store::config::{Boot, Startup};

use super::require_known;

/// List installed addons started automatically at a startup stage
#[derive(Args, Debug)]
pub struct BootSetArgs {
    /// Startup stage: before, after or once
    pub startup: Startup,
}

/// Set the boot policy of an installed addon
#[derive(Args, Debug)]
pub struct BootArgs {
    /// Qualified addon slug, e.g. `core_ssh`
    pub slug: String,

    /// Boot policy: auto or manual
    pub boot: Boot,
}

/// Execute the `boot-set` command.
pub fn execute_boot_set(args: BootSetArgs, store: &AddonStore) -> Result<()> {
    for slug in store.boot_set(args.startup) {
        println!("{slug}");
    }
    Ok(())
}

/// Execute the `boot` command.
pub fn execute(args: BootArgs, store: &mut AddonStore) -> Result<()> {
    let slug = args.slug.as_str();
    require_known(store, slug)?;

    store.set_boot(slug, args.boot)?;
    println!("✅ Boot policy of {slug} set to {}", args.boot);
    Ok(())
}
