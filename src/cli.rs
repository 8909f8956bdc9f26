//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use addon_store::addons::AddonStore;
use addon_store::config::Arch;
use addon_store::defaults::{self, ARCH_ENV, ROOT_ENV};
use addon_store::repository::DirectoryName;
use addon_store::settings::StoreSettings;
use addon_store::suggestions;

use crate::commands;

/// Addon Store - Track available and installed addons
#[derive(Parser, Debug)]
#[command(name = "addon-store")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Store root directory holding the addon folders and the state file.
    ///
    /// Defaults to the platform data directory (`~/.local/share/addon-store`
    /// on Linux).
    #[arg(long, global = true, value_name = "DIR", env = ROOT_ENV)]
    root: Option<PathBuf>,

    /// YAML file overriding individual store paths
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Architecture to resolve images for (armhf, aarch64, amd64, i386)
    #[arg(long, global = true, value_name = "ARCH", env = ARCH_ENV)]
    arch: Option<Arch>,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List installed and available addons
    List(commands::list::ListArgs),

    /// Show everything known about one addon
    Info(commands::info::InfoArgs),

    /// List the repositories that contributed addons
    Repos(commands::repos::ReposArgs),

    /// Install an addon from the catalog
    Install(commands::install::InstallArgs),

    /// Remove an installed addon
    Uninstall(commands::uninstall::UninstallArgs),

    /// Refreeze an installed addon from the catalog
    Update(commands::update::UpdateArgs),

    /// Pick up definition changes that shipped without a version bump
    Reconcile(commands::reconcile::ReconcileArgs),

    /// List installed addons started automatically at a startup stage
    BootSet(commands::boot::BootSetArgs),

    /// Set the boot policy of an installed addon
    Boot(commands::boot::BootArgs),

    /// Show, set or write the options of an installed addon
    Options(commands::options::OptionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .init();

        let mut store = self.open_store()?;

        match self.command {
            Commands::List(args) => commands::list::execute(args, &store),
            Commands::Info(args) => commands::info::execute(args, &store),
            Commands::Repos(args) => commands::repos::execute(args, &store),
            Commands::Install(args) => commands::install::execute(args, &mut store),
            Commands::Uninstall(args) => commands::uninstall::execute(args, &mut store),
            Commands::Update(args) => commands::update::execute(args, &mut store),
            Commands::Reconcile(args) => commands::reconcile::execute(args, &mut store),
            Commands::BootSet(args) => commands::boot::execute_boot_set(args, &store),
            Commands::Boot(args) => commands::boot::execute(args, &mut store),
            Commands::Options(args) => commands::options::execute(args, &mut store),
        }
    }

    /// Resolve settings and architecture, open the state file and rescan.
    fn open_store(&self) -> Result<AddonStore> {
        let root = self.root.clone().unwrap_or_else(defaults::default_root);
        let settings = match &self.settings {
            Some(path) => StoreSettings::from_file(&root, path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => StoreSettings::from_root(&root),
        };
        let arch = match self.arch {
            Some(arch) => arch,
            None => Arch::detect().ok_or_else(suggestions::unknown_arch)?,
        };

        let mut store = AddonStore::open(settings, arch)?;
        store.reload(&DirectoryName);
        Ok(store)
    }
}
