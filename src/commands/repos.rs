//! # Repos Command Implementation
//!
//! This module implements the `repos` subcommand, which lists every
//! repository the last scan registered, in registration order.

use anyhow::Result;
use clap::Args;

use addon_store::addons::AddonStore;

/// List the repositories that contributed addons
#[derive(Args, Debug)]
pub struct ReposArgs {}

/// Execute the `repos` command.
pub fn execute(_args: ReposArgs, store: &AddonStore) -> Result<()> {
    let repositories = store.list_repositories();
    if repositories.is_empty() {
        println!("No repositories found.");
        return Ok(());
    }

    for repository in repositories {
        println!("{}: {}", repository.slug, repository.name);
        if let Some(url) = &repository.url {
            println!("  url: {url}");
        }
        if let Some(maintainer) = &repository.maintainer {
            println!("  maintainer: {maintainer}");
        }
    }
    Ok(())
}
