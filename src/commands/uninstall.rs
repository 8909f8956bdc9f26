//! # Uninstall Command Implementation
//!
//! This module implements the `uninstall` subcommand, which removes both
//! halves of an addon's installed state. The addon data folder is left alone.

use anyhow::Result;
use clap::Args;

use addon_store::addons::AddonStore;

use super::require_known;

/// Remove an installed addon
#[derive(Args, Debug)]
pub struct UninstallArgs {
    /// Qualified addon slug, e.g. `core_ssh`
    pub slug: String,
}

/// Execute the `uninstall` command.
pub fn execute(args: UninstallArgs, store: &mut AddonStore) -> Result<()> {
    let slug = args.slug.as_str();
    require_known(store, slug)?;

    if !store.is_installed(slug) {
        println!("Addon {slug} is not installed.");
        return Ok(());
    }
    store.uninstall(slug)?;
    println!("🗑️  Uninstalled {slug}");
    Ok(())
}
