//! # Catalog Scanner
//!
//! Builds the catalog of available addons by walking the addon source
//! folders. A catalog is a snapshot: [`scan`] always starts from nothing and
//! the caller replaces its previous catalog with the result. Nothing is
//! merged incrementally and nothing is evicted.
//!
//! ## Scan Order
//!
//! 1.  Built-in core folder, tagged `core`.
//! 2.  Built-in local folder, tagged `local`.
//! 3.  Built-in repository records, for the tags that produced addons.
//! 4.  One pass per directory under the repositories root, sorted by name.
//!     Each must carry a valid `repository.json`; otherwise the whole
//!     directory is skipped.
//!
//! Inside a folder every `config.json` is found at any depth and visited in
//! path order. A file that can't be read or fails validation is logged,
//! recorded as a [`ScanWarning`], and skipped without affecting its siblings.
//! When two definitions share a qualified slug the one scanned last replaces
//! the earlier one.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{load_addon_config, load_repository_config, AddonConfig};
use crate::defaults::{
    ADDON_CONFIG_FILENAME, REPOSITORY_CONFIG_FILENAME, REPOSITORY_CORE, REPOSITORY_LOCAL,
};
use crate::error::Error;
use crate::repository::{builtin_repositories, RepositoryInfo, RepositoryRegistry, RepositorySlugRule};
use crate::settings::StoreSettings;

/// A problem that made the scanner skip a file or a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub message: String,
}

impl ScanWarning {
    fn from_error(path: &Path, error: &Error) -> Self {
        Self {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Addon definitions available in the current scan, keyed by qualified slug.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    addons: BTreeMap<String, AddonConfig>,
    repositories: RepositoryRegistry,
    warnings: Vec<ScanWarning>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition under its qualified slug, returning the one it replaced.
    pub fn insert(&mut self, config: AddonConfig) -> Option<AddonConfig> {
        let slug = config.qualified_slug(&config.repository);
        self.addons.insert(slug, config)
    }

    pub fn get(&self, slug: &str) -> Option<&AddonConfig> {
        self.addons.get(slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.addons.contains_key(slug)
    }

    pub fn len(&self) -> usize {
        self.addons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AddonConfig)> {
        self.addons.iter()
    }

    pub fn slugs(&self) -> impl Iterator<Item = &String> {
        self.addons.keys()
    }

    pub fn repositories(&self) -> &RepositoryRegistry {
        &self.repositories
    }

    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    fn warn(&mut self, path: &Path, error: &Error) {
        warn!("{}", error);
        self.warnings.push(ScanWarning::from_error(path, error));
    }

    fn read_addons_folder(&mut self, folder: &Path, repository: &str) {
        if !folder.is_dir() {
            debug!("Addon folder {} does not exist", folder.display());
            return;
        }

        for entry in WalkDir::new(folder).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(folder).to_path_buf();
                    let error = Error::SourceRead {
                        path: path.clone(),
                        message: e.to_string(),
                    };
                    self.warn(&path, &error);
                    continue;
                }
            };

            if !entry.file_type().is_file() || entry.file_name() != ADDON_CONFIG_FILENAME {
                continue;
            }

            let path = entry.path();
            match load_addon_config(path) {
                Ok(mut config) => {
                    config.repository = repository.to_string();
                    config.location = path.parent().unwrap_or(folder).to_path_buf();
                    let slug = config.qualified_slug(repository);
                    if self.insert(config).is_some() {
                        debug!("{} replaces an earlier definition of {}", path.display(), slug);
                    }
                }
                Err(e) => self.warn(path, &e),
            }
        }
    }

    fn register_builtin_repositories(&mut self) {
        let table = match builtin_repositories() {
            Ok(table) => table,
            Err(e) => {
                warn!("Can't read built-in repository table -> {}", e);
                return;
            }
        };

        for tag in [REPOSITORY_CORE, REPOSITORY_LOCAL] {
            let present = self.addons.values().any(|addon| addon.repository == tag);
            if let (true, Some(info)) = (present, table.get(tag)) {
                self.repositories.insert(info.clone());
            }
        }
    }

    fn read_repository(&mut self, path: &Path, rule: &dyn RepositorySlugRule) {
        let Some(slug) = rule.repository_slug(path) else {
            let error = Error::SourceRead {
                path: path.to_path_buf(),
                message: "can't derive a repository slug from this directory".to_string(),
            };
            self.warn(path, &error);
            return;
        };

        let config_path = path.join(REPOSITORY_CONFIG_FILENAME);
        let config = match load_repository_config(&config_path) {
            Ok(config) => config,
            Err(e) => {
                self.warn(&config_path, &e);
                debug!("Skipping every addon under {}", path.display());
                return;
            }
        };

        self.repositories
            .insert(RepositoryInfo::from_config(&slug, config));
        self.read_addons_folder(path, &slug);
    }
}

/// Subdirectories of the repositories root, sorted by name.
fn repository_dirs(root: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Repositories folder {} not readable: {}", root.display(), e);
            return Vec::new();
        }
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

/// Build a fresh catalog from the folders named in `settings`.
pub fn scan(settings: &StoreSettings, rule: &dyn RepositorySlugRule) -> Catalog {
    let mut catalog = Catalog::new();

    catalog.read_addons_folder(&settings.addons_core, REPOSITORY_CORE);
    catalog.read_addons_folder(&settings.addons_local, REPOSITORY_LOCAL);
    catalog.register_builtin_repositories();

    for dir in repository_dirs(&settings.addons_git) {
        catalog.read_repository(&dir, rule);
    }

    info!(
        "Catalog holds {} addons from {} repositories ({} skipped)",
        catalog.len(),
        catalog.repositories.len(),
        catalog.warnings.len()
    );
    catalog
}
