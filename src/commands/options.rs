//! # Options Command Implementation
//!
//! This module implements the `options` subcommand group:
//! - `show`: print the effective options (defaults overlaid by user options)
//! - `set`: validate a JSON object against the installed schema and store it
//! - `write`: validate the effective options and write `options.json` into
//!   the addon's data folder for the container runtime
//!
//! Invalid options are never stored or written.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::{Map, Value};

use addon_store::addons::AddonStore;
use addon_store::suggestions;

use super::require_known;

/// Show, set or write the options of an installed addon
#[derive(Args, Debug)]
pub struct OptionsArgs {
    #[command(subcommand)]
    pub action: OptionsAction,
}

#[derive(Subcommand, Debug)]
pub enum OptionsAction {
    /// Print the effective options
    Show {
        /// Qualified addon slug, e.g. `core_ssh`
        slug: String,
    },

    /// Validate and store user options
    Set {
        /// Qualified addon slug, e.g. `core_ssh`
        slug: String,

        /// Options as a JSON object, e.g. '{"port": 8080}'
        #[arg(value_name = "JSON")]
        options: String,
    },

    /// Validate the effective options and write them for the runtime
    Write {
        /// Qualified addon slug, e.g. `core_ssh`
        slug: String,
    },
}

/// Execute the `options` command.
pub fn execute(args: OptionsArgs, store: &mut AddonStore) -> Result<()> {
    match args.action {
        OptionsAction::Show { slug } => {
            require_known(store, &slug)?;
            let options = store.options(&slug)?;
            println!("{}", serde_json::to_string_pretty(&Value::Object(options))?);
        }
        OptionsAction::Set { slug, options } => {
            require_known(store, &slug)?;
            let parsed: Map<String, Value> = serde_json::from_str(&options)
                .map_err(|e| suggestions::invalid_options_json(&options, &e))?;
            store.set_options(&slug, parsed)?;
            println!("✅ Options of {slug} updated");
        }
        OptionsAction::Write { slug } => {
            require_known(store, &slug)?;
            store.write_options(&slug)?;
            println!("✅ Wrote {}", store.path_options(&slug).display());
        }
    }
    Ok(())
}
