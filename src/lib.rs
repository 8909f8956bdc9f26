//! # Addon Store Library
//!
//! This library is the local source of truth for an addon ecosystem: which
//! addons exist, which are installed, at what version and with what
//! configuration. It is used by the `addon-store` command-line tool but is
//! designed to be embedded by whatever process builds and runs the addon
//! containers.
//!
//! ## Quick Example
//!
//! ```no_run
//! use addon_store::addons::AddonStore;
//! use addon_store::config::{Arch, Startup};
//! use addon_store::repository::DirectoryName;
//! use addon_store::settings::StoreSettings;
//!
//! let settings = StoreSettings::from_root("/srv/addon-store");
//! let mut store = AddonStore::open(settings, Arch::Amd64).unwrap();
//!
//! // Rebuild the catalog from disk and pick up same-version corrections
//! store.reload(&DirectoryName);
//! store.reconcile_auto_updates().unwrap();
//!
//! store.install("core_ssh", "1.0").unwrap();
//! for slug in store.boot_set(Startup::Before) {
//!     store.write_options(&slug).unwrap();
//! }
//! ```
//!
//! ## Core Concepts
//!
//! - **Definitions (`config`)**: The `config.json` and `repository.json`
//!   documents, their schema rules and the volume-mapping grammar.
//! - **Options (`options`)**: Declarative option-type descriptions compiled
//!   into validators that normalize user-submitted options.
//! - **Catalog (`catalog`, `repository`)**: The scan-derived set of available
//!   addons and the repositories that contributed them.
//! - **Installed state (`state`)**: The persisted record of installed addons,
//!   split into a frozen system half and a user half.
//! - **Store (`addons`)**: The facade that combines the above.
//!
//! ## Execution Flow
//!
//! 1.  **Scan**: Walk the core, local and external repository folders into a
//!     fresh catalog.
//! 2.  **Reconcile**: Refresh frozen definitions whose catalog entry has the
//!     installed version.
//! 3.  **Mutate**: Install, update, uninstall, or change options and boot
//!     policy. Options are validated before anything is stored.
//! 4.  **Persist**: Every mutation atomically replaces the state file.

pub mod addons;
pub mod catalog;
pub mod config;
pub mod defaults;
pub mod error;
pub mod options;
pub mod repository;
pub mod settings;
pub mod state;
pub mod suggestions;

#[cfg(test)]
mod volume_proptest;
