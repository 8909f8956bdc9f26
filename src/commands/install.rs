//! # Install Command Implementation
//!
//! This module implements the `install` subcommand. The current catalog
//! definition is frozen into the state file together with the installed
//! version, and the user half starts with empty options.

use anyhow::Result;
use clap::Args;

use addon_store::addons::AddonStore;

use super::require_known;

/// Install an addon from the catalog
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Qualified addon slug, e.g. `core_ssh`
    pub slug: String,

    /// Version to record. Defaults to the catalog version.
    #[arg(long, value_name = "VERSION")]
    pub addon_version: Option<String>,
}

/// Execute the `install` command.
pub fn execute(args: InstallArgs, store: &mut AddonStore) -> Result<()> {
    let slug = args.slug.as_str();
    require_known(store, slug)?;

    if let Some(installed) = store.version_installed(slug) {
        anyhow::bail!(
            "Addon {slug} is already installed at version {installed}\n\n\
             hint: Run 'addon-store update {slug}' to move to another version"
        );
    }

    let version = match args.addon_version {
        Some(version) => version,
        None => store.last_version(slug).unwrap_or_default().to_string(),
    };
    store.install(slug, &version)?;
    println!("✅ Installed {slug} {version}");
    Ok(())
}
