//! # Update Command Implementation
//!
//! This module implements the `update` subcommand. The installed definition
//! is replaced by the current catalog entry and the recorded version moves to
//! the requested one; user options and boot policy are kept.
//!
//! Detached addons cannot be updated since no catalog entry exists to
//! refreeze from.

use anyhow::Result;
use clap::Args;

use addon_store::addons::AddonStore;

use super::require_known;

/// Refreeze an installed addon from the catalog
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Qualified addon slug, e.g. `core_ssh`
    pub slug: String,

    /// Version to record. Defaults to the catalog version.
    #[arg(long, value_name = "VERSION")]
    pub addon_version: Option<String>,
}

/// Execute the `update` command.
pub fn execute(args: UpdateArgs, store: &mut AddonStore) -> Result<()> {
    let slug = args.slug.as_str();
    require_known(store, slug)?;

    let installed = match store.version_installed(slug) {
        Some(installed) => installed.to_string(),
        None => anyhow::bail!(
            "Addon {slug} is not installed\n\n\
             hint: Run 'addon-store install {slug}' first"
        ),
    };

    let version = match args.addon_version {
        Some(version) => version,
        None => {
            if !store.has_update(slug) && store.catalog().contains(slug) {
                println!("Addon {slug} is up to date ({installed}).");
                return Ok(());
            }
            store.last_version(slug).unwrap_or_default().to_string()
        }
    };
    store.update(slug, &version)?;
    println!("✅ Updated {slug} {installed} -> {version}");
    Ok(())
}
