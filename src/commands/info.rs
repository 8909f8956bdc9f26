//! # Info Command Implementation
//!
//! This module implements the `info` subcommand, which displays everything
//! known about one addon: its description from the catalog (or from the
//! frozen definition when detached), the image it runs, and for installed
//! addons the deployment settings and effective options.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;

use addon_store::addons::AddonStore;

use super::{list, require_known};

/// Show everything known about one addon
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Qualified addon slug, e.g. `core_ssh`
    pub slug: String,
}

/// Execute the `info` command.
pub fn execute(args: InfoArgs, store: &AddonStore) -> Result<()> {
    let slug = args.slug.as_str();
    require_known(store, slug)?;

    println!("📦 {}", slug);
    if let Some(name) = store.name(slug) {
        println!("  name: {name}");
    }
    if let Some(description) = store.description(slug) {
        println!("  description: {description}");
    }
    if let Some(repository) = store.repository(slug) {
        println!("  repository: {repository}");
    }
    if let Some(url) = store.url(slug) {
        println!("  url: {url}");
    }
    let detached = store.list_detached().contains(slug);
    println!("  status: {}", list::status(store, slug, detached));
    if let Some(arch) = store.supported_arch(slug) {
        let arch: Vec<&str> = arch.iter().map(|a| a.as_str()).collect();
        println!("  arch: {}", arch.join(", "));
    }
    let image = store.image(slug)?;
    if store.needs_build(slug)? {
        println!("  image: {image} (built locally)");
    } else {
        println!("  image: {image}");
    }

    if !store.is_installed(slug) {
        return Ok(());
    }

    println!("  boot: {}", store.boot(slug)?);
    let ports = store.ports(slug)?;
    if !ports.is_empty() {
        println!("  ports:");
        for (container, host) in ports {
            println!("    {container} -> {host}");
        }
    }
    let volumes = store.map_volumes(slug)?;
    if !volumes.is_empty() {
        println!("  volumes:");
        for (path, mode) in &volumes {
            println!("    {path} ({mode})");
        }
    }
    let devices = store.devices(slug)?;
    if !devices.is_empty() {
        println!("  devices: {}", devices.join(", "));
    }
    let environment = store.environment(slug)?;
    if !environment.is_empty() {
        println!("  environment:");
        for (key, value) in environment {
            println!("    {key}={value}");
        }
    }
    println!(
        "  options: {}",
        serde_json::Value::Object(store.options(slug)?)
    );
    println!("  data: {}", store.path_data(slug).display());
    Ok(())
}
