//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `addon-store` command-line tool. Each subcommand is defined in its own file
//! to keep the logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and the freshly scanned
//!   store and performs the command's logic.

use anyhow::Result;

use addon_store::addons::AddonStore;
use addon_store::suggestions;

pub mod boot;
pub mod info;
pub mod install;
pub mod list;
pub mod options;
pub mod reconcile;
pub mod repos;
pub mod uninstall;
pub mod update;

/// Fail with a did-you-mean hint unless `slug` is installed or available.
pub(crate) fn require_known(store: &AddonStore, slug: &str) -> Result<()> {
    if store.exists(slug) {
        return Ok(());
    }
    let known = store.list_all();
    let known: Vec<&str> = known.iter().map(String::as_str).collect();
    Err(suggestions::unknown_addon(slug, &known))
}
