//! # Definition Schemas and Parsing
//!
//! This module defines the documents the store consumes from disk and the
//! rules each must satisfy before it is admitted to the catalog.
//!
//! ## Key Components
//!
//! - **`AddonConfig`**: An addon definition (`config.json`). The same type is
//!   persisted as the frozen system half of an installed addon, so fields the
//!   scanner fills in (`repository`, `location`) live here too.
//!
//! - **`RepositoryConfig`**: The `repository.json` found at the root of every
//!   external repository.
//!
//! - **`VolumeMapping`**: One `path[:mode]` directive from an addon's `map`
//!   list.
//!
//! ## Parsing
//!
//! [`parse_document`] separates the two ways a file can be rejected. JSON that
//! does not parse at all is a [`Error::SourceRead`]; JSON whose shape or
//! content breaks the schema is an [`Error::SchemaValidation`]. Structural
//! rules serde cannot express (volume grammar, port keys, device triples,
//! URLs) are checked afterwards by `validate`, with the field path at the
//! start of the message.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::options::OptionsSchema;

/// `path[:mode]`; mode is `ro` or `rw`.
pub const VOLUME_PATTERN: &str = r"^([^:]+)(?::(rw|ro))?$";

/// `<port>/<protocol>` keys of the `ports` map.
const PORT_PATTERN: &str = r"^\d+/(tcp|udp)$";

/// `<host path>:<container path>:<cgroup permissions>`.
const DEVICE_PATTERN: &str = r"^[^:]+:[^:]+:[rwm]+$";

const SLUG_PATTERN: &str = r"^[\w.-]+$";

/// Placeholder substituted with the detected architecture in image templates.
pub const ARCH_PLACEHOLDER: &str = "{arch}";

/// When an addon starts relative to the platform's main application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Startup {
    Before,
    After,
    Once,
}

impl fmt::Display for Startup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Startup::Before => "before",
            Startup::After => "after",
            Startup::Once => "once",
        })
    }
}

impl FromStr for Startup {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "before" => Ok(Startup::Before),
            "after" => Ok(Startup::After),
            "once" => Ok(Startup::Once),
            other => Err(format!(
                "unknown startup class \"{other}\" (expected before, after or once)"
            )),
        }
    }
}

/// Boot policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boot {
    #[default]
    Auto,
    Manual,
}

impl fmt::Display for Boot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Boot::Auto => "auto",
            Boot::Manual => "manual",
        })
    }
}

impl FromStr for Boot {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Boot::Auto),
            "manual" => Ok(Boot::Manual),
            other => Err(format!(
                "unknown boot policy \"{other}\" (expected auto or manual)"
            )),
        }
    }
}

/// CPU architectures an addon image can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    Armhf,
    Aarch64,
    Amd64,
    I386,
}

impl Arch {
    /// Every supported architecture; the default for definitions that omit `arch`.
    pub fn all() -> Vec<Arch> {
        vec![Arch::Armhf, Arch::Aarch64, Arch::Amd64, Arch::I386]
    }

    /// Architecture of the running build target, if it is a supported one.
    pub fn detect() -> Option<Arch> {
        match std::env::consts::ARCH {
            "x86_64" => Some(Arch::Amd64),
            "x86" => Some(Arch::I386),
            "aarch64" => Some(Arch::Aarch64),
            "arm" => Some(Arch::Armhf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Armhf => "armhf",
            Arch::Aarch64 => "aarch64",
            Arch::Amd64 => "amd64",
            Arch::I386 => "i386",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "armhf" => Ok(Arch::Armhf),
            "aarch64" => Ok(Arch::Aarch64),
            "amd64" => Ok(Arch::Amd64),
            "i386" => Ok(Arch::I386),
            other => Err(format!(
                "unknown architecture \"{other}\" (expected armhf, aarch64, amd64 or i386)"
            )),
        }
    }
}

/// An addon definition as read from `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonConfig {
    pub name: String,
    pub version: String,
    pub slug: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Required in definition files. Optional here so that frozen records
    /// written by older schemas still load; such addons are reported as
    /// orphaned by startup queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup: Option<Startup>,
    #[serde(default)]
    pub boot: Boot,
    #[serde(default = "Arch::all")]
    pub arch: Vec<Arch>,
    /// Option defaults.
    #[serde(default)]
    pub options: Map<String, Value>,
    /// Option types.
    #[serde(default)]
    pub schema: OptionsSchema,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ports: BTreeMap<String, u16>,
    /// Volume directives, `path[:mode]`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub map: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    /// Remote image template; absent means the addon is built locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Repository tag, set by the scanner.
    #[serde(default)]
    pub repository: String,
    /// Folder the definition was read from, set by the scanner.
    #[serde(default)]
    pub location: PathBuf,
}

impl AddonConfig {
    /// Check the rules serde cannot express.
    ///
    /// `path` only labels the error.
    pub fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |message: String| Error::SchemaValidation {
            path: path.to_path_buf(),
            message,
        };

        if !Regex::new(SLUG_PATTERN).map_err(Error::Regex)?.is_match(&self.slug) {
            return Err(invalid(format!("slug: invalid slug \"{}\"", self.slug)));
        }
        if self.version.trim().is_empty() {
            return Err(invalid("version: must not be empty".to_string()));
        }
        if self.startup.is_none() {
            return Err(invalid("startup: required field is missing".to_string()));
        }
        if self.arch.is_empty() {
            return Err(invalid("arch: at least one architecture is required".to_string()));
        }
        if let Some(url) = &self.url {
            url::Url::parse(url).map_err(|e| invalid(format!("url: {e}")))?;
        }
        if let Some(image) = &self.image {
            if image.trim().is_empty() {
                return Err(invalid("image: must not be empty".to_string()));
            }
        }

        let port = Regex::new(PORT_PATTERN).map_err(Error::Regex)?;
        for key in self.ports.keys() {
            if !port.is_match(key) {
                return Err(invalid(format!("ports.{key}: expected <port>/tcp or <port>/udp")));
            }
        }

        let volume = Regex::new(VOLUME_PATTERN).map_err(Error::Regex)?;
        for (index, directive) in self.map.iter().enumerate() {
            if !volume.is_match(directive) {
                return Err(invalid(format!(
                    "map[{index}]: invalid volume mapping \"{directive}\""
                )));
            }
        }

        let device = Regex::new(DEVICE_PATTERN).map_err(Error::Regex)?;
        for (index, entry) in self.devices.iter().enumerate() {
            if !device.is_match(entry) {
                return Err(invalid(format!(
                    "devices[{index}]: expected host:container:permissions, got \"{entry}\""
                )));
            }
        }

        Ok(())
    }

    /// Qualified catalog key for this definition under `repository`.
    pub fn qualified_slug(&self, repository: &str) -> String {
        qualified_slug(repository, &self.slug)
    }
}

/// Catalog key of `slug` within `repository`.
pub fn qualified_slug(repository: &str, slug: &str) -> String {
    format!("{repository}_{slug}")
}

/// Metadata file at the root of an external repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,
}

impl RepositoryConfig {
    pub fn validate(&self, path: &Path) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::SchemaValidation {
                path: path.to_path_buf(),
                message: "name: must not be empty".to_string(),
            });
        }
        if let Some(url) = &self.url {
            url::Url::parse(url).map_err(|e| Error::SchemaValidation {
                path: path.to_path_buf(),
                message: format!("url: {e}"),
            })?;
        }
        Ok(())
    }
}

/// Deserialize a JSON document, classifying failures by cause.
pub fn parse_document<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T> {
    serde_json::from_str(content).map_err(|e| match e.classify() {
        serde_json::error::Category::Data => Error::SchemaValidation {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
        _ => Error::SourceRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })
}

/// Read, parse and validate an addon definition file.
pub fn load_addon_config(path: &Path) -> Result<AddonConfig> {
    let content = read_source(path)?;
    let config: AddonConfig = parse_document(path, &content)?;
    config.validate(path)?;
    Ok(config)
}

/// Read, parse and validate a repository config file.
pub fn load_repository_config(path: &Path) -> Result<RepositoryConfig> {
    let content = read_source(path)?;
    let config: RepositoryConfig = parse_document(path, &content)?;
    config.validate(path)?;
    Ok(config)
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::SourceRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Access mode of a mapped volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeMode {
    #[default]
    Ro,
    Rw,
}

impl fmt::Display for VolumeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VolumeMode::Ro => "ro",
            VolumeMode::Rw => "rw",
        })
    }
}

/// A parsed `path[:mode]` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMapping {
    pub path: String,
    pub mode: VolumeMode,
}

impl FromStr for VolumeMapping {
    type Err = Error;

    fn from_str(directive: &str) -> Result<Self> {
        let regex = Regex::new(VOLUME_PATTERN).map_err(Error::Regex)?;
        let captures = regex
            .captures(directive)
            .ok_or_else(|| Error::VolumeMapping {
                directive: directive.to_string(),
            })?;

        let mode = match captures.get(2).map(|m| m.as_str()) {
            Some("rw") => VolumeMode::Rw,
            _ => VolumeMode::Ro,
        };

        Ok(Self {
            path: captures[1].to_string(),
            mode,
        })
    }
}
