//! # List Command Implementation
//!
//! This module implements the `list` subcommand, which prints one line per
//! addon with its installed and available versions.
//!
//! Without a filter every installed or available addon is listed. The
//! filters are mutually exclusive:
//! - `--installed`: addons recorded in the state file
//! - `--detached`: installed addons whose source is gone from the catalog
//! - `--available`: addons in the current catalog
//!
//! This command is a safe, read-only operation.

use std::collections::BTreeSet;

use anyhow::Result;
use clap::Args;

use addon_store::addons::AddonStore;

/// List installed and available addons
#[derive(Args, Debug)]
#[group(multiple = false)]
pub struct ListArgs {
    /// Only list installed addons
    #[arg(long)]
    pub installed: bool,

    /// Only list installed addons that no repository provides anymore
    #[arg(long)]
    pub detached: bool,

    /// Only list addons in the catalog
    #[arg(long)]
    pub available: bool,
}

/// Execute the `list` command.
pub fn execute(args: ListArgs, store: &AddonStore) -> Result<()> {
    let slugs: BTreeSet<String> = if args.installed {
        store.list_installed()
    } else if args.detached {
        store.list_detached()
    } else if args.available {
        store.catalog().slugs().cloned().collect()
    } else {
        store.list_all()
    };

    if slugs.is_empty() {
        println!("No addons found.");
        return Ok(());
    }

    let detached = store.list_detached();
    for slug in &slugs {
        let status = status(store, slug, detached.contains(slug));
        println!("{:<32} {}", slug, status);
    }
    Ok(())
}

/// Short version summary for one addon.
pub(crate) fn status(store: &AddonStore, slug: &str, detached: bool) -> String {
    match (store.version_installed(slug), store.catalog().get(slug)) {
        (Some(installed), _) if detached => format!("installed {installed} (detached)"),
        (Some(installed), Some(_)) if store.has_update(slug) => format!(
            "installed {installed}, update {} available",
            store.last_version(slug).unwrap_or_default()
        ),
        (Some(installed), _) => format!("installed {installed}"),
        (None, Some(available)) => format!("available {}", available.version),
        (None, None) => "unknown".to_string(),
    }
}
