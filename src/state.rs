//! # Installed-State Store
//!
//! The persisted record of installed addons. Each installed addon is stored
//! as two halves under the same qualified slug:
//!
//! - **system**: a frozen copy of the addon definition, taken from the catalog
//!   at install or update time. Scans never touch it; only install, update and
//!   reconciliation replace it.
//! - **user**: the user's option overrides, an optional boot override and the
//!   installed version. It survives every refresh of the system half.
//!
//! The halves are created and removed together.
//!
//! ## Persistence
//!
//! Every mutation builds the complete next document, hands it to the
//! [`StateFile`] backend, and only adopts it in memory once the backend
//! reports success. [`JsonStateFile`] writes the whole document to a
//! temporary sibling file and renames it over the target, so a crash leaves
//! either the old or the new document on disk, never a mix.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::Catalog;
use crate::config::{AddonConfig, Boot, Startup};
use crate::error::{Error, Result};

/// The user-owned half of an installed addon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub options: Map<String, Value>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot: Option<Boot>,
}

impl UserConfig {
    fn new(version: &str) -> Self {
        Self {
            options: Map::new(),
            version: version.to_string(),
            boot: None,
        }
    }
}

/// The persisted document: user overrides and frozen system definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub user: BTreeMap<String, UserConfig>,
    #[serde(default)]
    pub system: BTreeMap<String, AddonConfig>,
}

impl StateDocument {
    /// Drop entries that lack their other half.
    fn drop_unpaired(&mut self) {
        let user = &self.user;
        let system = &self.system;
        let unpaired: Vec<String> = user
            .keys()
            .filter(|slug| !system.contains_key(*slug))
            .chain(system.keys().filter(|slug| !user.contains_key(*slug)))
            .cloned()
            .collect();

        for slug in unpaired {
            warn!("Dropping incomplete state record for {}", slug);
            self.user.remove(&slug);
            self.system.remove(&slug);
        }
    }
}

/// Backing storage for the state document.
pub trait StateFile {
    /// Load the document; a store that was never saved yields an empty one.
    fn load(&self) -> Result<StateDocument>;

    /// Replace the stored document with `document` as a whole.
    fn save(&self, document: &StateDocument) -> Result<()>;
}

/// JSON file on disk, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonStateFile {
    path: PathBuf,
}

impl JsonStateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateFile for JsonStateFile {
    fn load(&self) -> Result<StateDocument> {
        if !self.path.exists() {
            return Ok(StateDocument::default());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| Error::StateFile {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| Error::StateFile {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn save(&self, document: &StateDocument) -> Result<()> {
        write_json_atomic(&self.path, document).map_err(|e| Error::StateFile {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

/// Serialize `value` as pretty JSON into `path` via a temporary sibling file.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut contents = serde_json::to_vec_pretty(value)?;
    contents.push(b'\n');
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let mut tmp_name = OsString::from(path.as_os_str());
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    std::fs::write(&tmp_path, &contents)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

#[derive(Debug, Default)]
struct MemoryContents {
    document: StateDocument,
    saves: usize,
}

/// In-memory backend that counts saves.
///
/// Clones share the same contents, so a handle kept by the caller observes
/// every save made through the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateFile {
    contents: Rc<RefCell<MemoryContents>>,
}

impl MemoryStateFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already populated document.
    pub fn with_document(document: StateDocument) -> Self {
        let file = Self::new();
        file.contents.borrow_mut().document = document;
        file
    }

    /// Number of saves performed so far.
    pub fn saves(&self) -> usize {
        self.contents.borrow().saves
    }

    /// The last saved document.
    pub fn document(&self) -> StateDocument {
        self.contents.borrow().document.clone()
    }
}

impl StateFile for MemoryStateFile {
    fn load(&self) -> Result<StateDocument> {
        Ok(self.document())
    }

    fn save(&self, document: &StateDocument) -> Result<()> {
        let mut contents = self.contents.borrow_mut();
        contents.document = document.clone();
        contents.saves += 1;
        Ok(())
    }
}

/// Installed addons and their persisted halves.
pub struct InstalledState {
    document: StateDocument,
    file: Box<dyn StateFile>,
}

impl std::fmt::Debug for InstalledState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstalledState")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl InstalledState {
    /// Load the state held by `file`.
    pub fn load(file: Box<dyn StateFile>) -> Result<Self> {
        let mut document = file.load()?;
        document.drop_unpaired();
        Ok(Self { document, file })
    }

    /// Load the state from a JSON file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::load(Box::new(JsonStateFile::new(path)))
    }

    pub fn document(&self) -> &StateDocument {
        &self.document
    }

    /// Apply `change` to a copy, persist it, then adopt it.
    fn commit<F>(&mut self, change: F) -> Result<()>
    where
        F: FnOnce(&mut StateDocument),
    {
        let mut next = self.document.clone();
        change(&mut next);
        self.file.save(&next)?;
        self.document = next;
        Ok(())
    }

    fn user_config(&self, slug: &str) -> Result<&UserConfig> {
        self.document.user.get(slug).ok_or_else(|| Error::NotInstalled {
            slug: slug.to_string(),
        })
    }

    fn system_config(&self, slug: &str) -> Result<&AddonConfig> {
        self.document
            .system
            .get(slug)
            .ok_or_else(|| Error::NotInstalled {
                slug: slug.to_string(),
            })
    }

    /// Record `slug` as installed at `version` with `config` frozen.
    ///
    /// Installing over an existing record starts over with empty options.
    pub fn install(&mut self, slug: &str, config: &AddonConfig, version: &str) -> Result<()> {
        self.commit(|doc| {
            doc.system.insert(slug.to_string(), config.clone());
            doc.user.insert(slug.to_string(), UserConfig::new(version));
        })?;
        info!("Addon {} installed at version {}", slug, version);
        Ok(())
    }

    /// Remove both halves of `slug`; absent addons are not an error.
    pub fn uninstall(&mut self, slug: &str) -> Result<()> {
        self.commit(|doc| {
            doc.system.remove(slug);
            doc.user.remove(slug);
        })?;
        info!("Addon {} uninstalled", slug);
        Ok(())
    }

    /// Refreeze `config` and record `version`, keeping options and boot.
    pub fn update(&mut self, slug: &str, config: &AddonConfig, version: &str) -> Result<()> {
        self.user_config(slug)?;
        self.commit(|doc| {
            doc.system.insert(slug.to_string(), config.clone());
            if let Some(user) = doc.user.get_mut(slug) {
                user.version = version.to_string();
            }
        })?;
        info!("Addon {} updated to version {}", slug, version);
        Ok(())
    }

    /// Refresh frozen definitions whose catalog entry has the installed version.
    ///
    /// Persists at most once. Returns whether anything changed.
    pub fn reconcile(&mut self, catalog: &Catalog) -> Result<bool> {
        let mut refreshed = BTreeMap::new();
        for (slug, user) in &self.document.user {
            // detached
            let Some(available) = catalog.get(slug) else {
                continue;
            };
            if user.version != available.version {
                continue;
            }
            if self.document.system.get(slug) != Some(available) {
                refreshed.insert(slug.clone(), available.clone());
            }
        }

        if refreshed.is_empty() {
            return Ok(false);
        }

        let slugs: Vec<String> = refreshed.keys().cloned().collect();
        self.commit(|doc| doc.system.extend(refreshed))?;
        info!("Refreshed definitions of {}", slugs.join(", "));
        Ok(true)
    }

    /// Store `options` as the user overrides of `slug`.
    ///
    /// Validation is the caller's job.
    pub fn set_options(&mut self, slug: &str, options: Map<String, Value>) -> Result<()> {
        self.user_config(slug)?;
        self.commit(|doc| {
            if let Some(user) = doc.user.get_mut(slug) {
                user.options = options;
            }
        })
    }

    pub fn set_boot(&mut self, slug: &str, boot: Boot) -> Result<()> {
        self.user_config(slug)?;
        self.commit(|doc| {
            if let Some(user) = doc.user.get_mut(slug) {
                user.boot = Some(boot);
            }
        })
    }

    /// Option defaults overlaid key by key with the user's overrides.
    pub fn options(&self, slug: &str) -> Result<Map<String, Value>> {
        let mut merged = self.system_config(slug)?.options.clone();
        for (key, value) in &self.user_config(slug)?.options {
            merged.insert(key.clone(), value.clone());
        }
        Ok(merged)
    }

    /// User boot override, else the frozen definition's default.
    pub fn boot(&self, slug: &str) -> Result<Boot> {
        match self.user_config(slug)?.boot {
            Some(boot) => Ok(boot),
            None => Ok(self.system_config(slug)?.boot),
        }
    }

    /// Installed addons with effective boot `auto` and the given startup class.
    pub fn list_startup(&self, startup: Startup) -> BTreeSet<String> {
        let mut addons = BTreeSet::new();
        for (slug, system) in &self.document.system {
            if !matches!(self.boot(slug), Ok(Boot::Auto)) {
                continue;
            }
            match system.startup {
                Some(class) if class == startup => {
                    addons.insert(slug.clone());
                }
                Some(_) => {}
                None => warn!(
                    "{}",
                    Error::OrphanedAddon {
                        slug: slug.clone(),
                        field: "startup".to_string(),
                    }
                ),
            }
        }
        addons
    }

    pub fn list_installed(&self) -> BTreeSet<String> {
        self.document.system.keys().cloned().collect()
    }

    /// Installed addons missing from `catalog`.
    pub fn list_detached(&self, catalog: &Catalog) -> BTreeSet<String> {
        self.document
            .system
            .keys()
            .filter(|slug| !catalog.contains(slug))
            .cloned()
            .collect()
    }

    pub fn is_installed(&self, slug: &str) -> bool {
        self.document.system.contains_key(slug)
    }

    pub fn version_installed(&self, slug: &str) -> Option<&str> {
        self.document.user.get(slug).map(|user| user.version.as_str())
    }

    /// Frozen definition of an installed addon.
    pub fn system(&self, slug: &str) -> Option<&AddonConfig> {
        self.document.system.get(slug)
    }

    pub fn user(&self, slug: &str) -> Option<&UserConfig> {
        self.document.user.get(slug)
    }
}
