//! # Store Settings
//!
//! Filesystem locations the store reads from and writes to. Every location is
//! derived from a single root directory unless overridden, either
//! programmatically or from a YAML settings file:
//!
//! ```yaml
//! addons_git: /mnt/repositories
//! extern_addons_data: /host/addons/data
//! ```
//!
//! Keys that are omitted keep their root-derived default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults::STATE_FILENAME;
use crate::error::{Error, Result};

/// Resolved locations used by the catalog scanner and the installed-state store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Folder holding the built-in core addons.
    pub addons_core: PathBuf,
    /// Folder holding user-provided local addons.
    pub addons_local: PathBuf,
    /// Folder with one subdirectory per external repository.
    pub addons_git: PathBuf,
    /// Per-addon data folders, as seen by this process.
    pub addons_data: PathBuf,
    /// Per-addon data folders, as seen by the container runtime.
    pub extern_addons_data: PathBuf,
    /// Persisted installed-state document.
    pub state_file: PathBuf,
}

/// Partial settings as written in a settings file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    addons_core: Option<PathBuf>,
    addons_local: Option<PathBuf>,
    addons_git: Option<PathBuf>,
    addons_data: Option<PathBuf>,
    extern_addons_data: Option<PathBuf>,
    state_file: Option<PathBuf>,
}

impl StoreSettings {
    /// Derive every location from `root`.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let addons = root.join("addons");
        let data = addons.join("data");
        Self {
            addons_core: addons.join("core"),
            addons_local: addons.join("local"),
            addons_git: addons.join("git"),
            extern_addons_data: data.clone(),
            addons_data: data,
            state_file: root.join(STATE_FILENAME),
        }
    }

    /// Parse YAML overrides on top of the defaults for `root`.
    pub fn from_yaml(root: impl AsRef<Path>, content: &str) -> Result<Self> {
        let overrides: SettingsFile = if content.trim().is_empty() {
            SettingsFile::default()
        } else {
            serde_yaml::from_str(content)?
        };

        let mut settings = Self::from_root(root);
        // An overridden data folder also moves the external view unless that
        // one is given explicitly.
        if let Some(data) = overrides.addons_data {
            settings.extern_addons_data = data.clone();
            settings.addons_data = data;
        }
        if let Some(core) = overrides.addons_core {
            settings.addons_core = core;
        }
        if let Some(local) = overrides.addons_local {
            settings.addons_local = local;
        }
        if let Some(git) = overrides.addons_git {
            settings.addons_git = git;
        }
        if let Some(extern_data) = overrides.extern_addons_data {
            settings.extern_addons_data = extern_data;
        }
        if let Some(state_file) = overrides.state_file {
            settings.state_file = state_file;
        }
        Ok(settings)
    }

    /// Load YAML overrides from `path` on top of the defaults for `root`.
    pub fn from_file(root: impl AsRef<Path>, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Settings {
            message: format!("can't read {}: {}", path.display(), e),
        })?;
        Self::from_yaml(root, &content)
    }
}
