//! # Addon Store
//!
//! [`AddonStore`] ties the pieces together: the settings that locate every
//! folder, the detected architecture, the catalog from the latest scan and the
//! installed state. It is an ordinary value owned by the caller and passed by
//! reference to whatever needs it.
//!
//! ## Lookups
//!
//! Descriptive accessors (name, description, repository, url, architectures)
//! prefer the catalog entry, which is the most current description of an
//! addon, and fall back to the frozen definition of the installed copy when
//! the addon is detached. Deployment accessors (ports, devices, environment,
//! volumes, option schema) read the frozen definition only, since that is what
//! is actually running.
//!
//! ## Concurrency
//!
//! None. Callers serialize scans and mutations themselves.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use log::error;
use serde_json::{Map, Value};

use crate::catalog::{self, Catalog};
use crate::config::{AddonConfig, Arch, Boot, Startup, VolumeMapping, VolumeMode, ARCH_PLACEHOLDER};
use crate::defaults::OPTIONS_FILENAME;
use crate::error::{Error, Result};
use crate::options::{OptionsSchema, OptionsValidator};
use crate::repository::{RepositoryInfo, RepositorySlugRule};
use crate::settings::StoreSettings;
use crate::state::{write_json_atomic, InstalledState};

/// Catalog, installed state and the settings that locate them.
#[derive(Debug)]
pub struct AddonStore {
    settings: StoreSettings,
    arch: Arch,
    catalog: Catalog,
    state: InstalledState,
}

impl AddonStore {
    /// Open the JSON state file named in `settings`. The catalog starts empty.
    pub fn open(settings: StoreSettings, arch: Arch) -> Result<Self> {
        let state = InstalledState::open(settings.state_file.clone())?;
        Ok(Self::with_state(settings, arch, state))
    }

    pub fn with_state(settings: StoreSettings, arch: Arch, state: InstalledState) -> Self {
        Self {
            settings,
            arch,
            catalog: Catalog::new(),
            state,
        }
    }

    /// Rescan every addon source and replace the catalog.
    pub fn reload(&mut self, rule: &dyn RepositorySlugRule) -> &Catalog {
        self.catalog = catalog::scan(&self.settings, rule);
        &self.catalog
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn arch(&self) -> Arch {
        self.arch
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &InstalledState {
        &self.state
    }

    /// Catalog entry, else frozen definition.
    fn lookup(&self, slug: &str) -> Option<&AddonConfig> {
        self.catalog.get(slug).or_else(|| self.state.system(slug))
    }

    /// Frozen definition, else catalog entry.
    fn lookup_deployed(&self, slug: &str) -> Result<&AddonConfig> {
        self.state
            .system(slug)
            .or_else(|| self.catalog.get(slug))
            .ok_or_else(|| Error::UnknownAddon {
                slug: slug.to_string(),
            })
    }

    fn installed(&self, slug: &str) -> Result<&AddonConfig> {
        self.state.system(slug).ok_or_else(|| Error::NotInstalled {
            slug: slug.to_string(),
        })
    }

    fn available(&self, slug: &str) -> Result<&AddonConfig> {
        self.catalog.get(slug).ok_or_else(|| Error::NotInCatalog {
            slug: slug.to_string(),
            hint: self
                .state
                .is_installed(slug)
                .then(|| "The addon is installed but detached from its repository".to_string()),
        })
    }

    // ---- mutations ----

    /// Install `slug` from the catalog, recording `version`.
    pub fn install(&mut self, slug: &str, version: &str) -> Result<()> {
        let config = self.available(slug)?.clone();
        self.state.install(slug, &config, version)
    }

    pub fn uninstall(&mut self, slug: &str) -> Result<()> {
        self.state.uninstall(slug)
    }

    /// Refreeze `slug` from the catalog and record `version`.
    pub fn update(&mut self, slug: &str, version: &str) -> Result<()> {
        let config = self.available(slug)?.clone();
        self.state.update(slug, &config, version)
    }

    /// Pick up definition changes that shipped without a version bump.
    pub fn reconcile_auto_updates(&mut self) -> Result<bool> {
        self.state.reconcile(&self.catalog)
    }

    /// Validate `options` against the installed schema and store them.
    pub fn set_options(&mut self, slug: &str, options: Map<String, Value>) -> Result<()> {
        let normalized = self
            .options_validator(slug)?
            .validate(&options)
            .map_err(|source| Error::OptionsValidation {
                slug: slug.to_string(),
                source,
            })?;
        self.state.set_options(slug, normalized)
    }

    pub fn set_boot(&mut self, slug: &str, boot: Boot) -> Result<()> {
        self.state.set_boot(slug, boot)
    }

    // ---- listings ----

    pub fn list_installed(&self) -> BTreeSet<String> {
        self.state.list_installed()
    }

    /// Installed and available addons.
    pub fn list_all(&self) -> BTreeSet<String> {
        let mut all = self.state.list_installed();
        all.extend(self.catalog.slugs().cloned());
        all
    }

    pub fn list_detached(&self) -> BTreeSet<String> {
        self.state.list_detached(&self.catalog)
    }

    pub fn list_repositories(&self) -> &[RepositoryInfo] {
        self.catalog.repositories().list()
    }

    /// Installed addons to start automatically at `startup`.
    pub fn boot_set(&self, startup: Startup) -> BTreeSet<String> {
        self.state.list_startup(startup)
    }

    pub fn exists(&self, slug: &str) -> bool {
        self.catalog.contains(slug) || self.state.is_installed(slug)
    }

    pub fn is_installed(&self, slug: &str) -> bool {
        self.state.is_installed(slug)
    }

    pub fn version_installed(&self, slug: &str) -> Option<&str> {
        self.state.version_installed(slug)
    }

    /// Whether the catalog offers a version other than the installed one.
    pub fn has_update(&self, slug: &str) -> bool {
        match (self.version_installed(slug), self.catalog.get(slug)) {
            (Some(installed), Some(available)) => installed != available.version,
            _ => false,
        }
    }

    // ---- effective configuration ----

    pub fn options(&self, slug: &str) -> Result<Map<String, Value>> {
        self.state.options(slug)
    }

    pub fn boot(&self, slug: &str) -> Result<Boot> {
        self.state.boot(slug)
    }

    // ---- descriptive accessors ----

    pub fn name(&self, slug: &str) -> Option<&str> {
        self.lookup(slug).map(|addon| addon.name.as_str())
    }

    pub fn description(&self, slug: &str) -> Option<&str> {
        self.lookup(slug).map(|addon| addon.description.as_str())
    }

    pub fn repository(&self, slug: &str) -> Option<&str> {
        self.lookup(slug).map(|addon| addon.repository.as_str())
    }

    pub fn url(&self, slug: &str) -> Option<&str> {
        self.lookup(slug).and_then(|addon| addon.url.as_deref())
    }

    pub fn supported_arch(&self, slug: &str) -> Option<&[Arch]> {
        self.lookup(slug).map(|addon| addon.arch.as_slice())
    }

    /// Catalog version, else the installed version.
    pub fn last_version(&self, slug: &str) -> Option<&str> {
        match self.catalog.get(slug) {
            Some(addon) => Some(addon.version.as_str()),
            None => self.version_installed(slug),
        }
    }

    // ---- deployment accessors ----

    pub fn ports(&self, slug: &str) -> Result<&BTreeMap<String, u16>> {
        Ok(&self.installed(slug)?.ports)
    }

    pub fn devices(&self, slug: &str) -> Result<&[String]> {
        Ok(&self.installed(slug)?.devices)
    }

    pub fn environment(&self, slug: &str) -> Result<&BTreeMap<String, String>> {
        Ok(&self.installed(slug)?.environment)
    }

    pub fn schema(&self, slug: &str) -> Result<&OptionsSchema> {
        Ok(&self.installed(slug)?.schema)
    }

    /// Image reference to run for `slug` on this architecture.
    pub fn image(&self, slug: &str) -> Result<String> {
        let addon = self.lookup_deployed(slug)?;
        Ok(match &addon.image {
            Some(template) => template.replace(ARCH_PLACEHOLDER, self.arch.as_str()),
            None => format!("{}/{}-addon-{}", addon.repository, self.arch, addon.slug),
        })
    }

    /// True exactly when no image template is declared.
    pub fn needs_build(&self, slug: &str) -> Result<bool> {
        Ok(self.lookup_deployed(slug)?.image.is_none())
    }

    /// Volume path to access mode.
    pub fn map_volumes(&self, slug: &str) -> Result<BTreeMap<String, VolumeMode>> {
        self.installed(slug)?
            .map
            .iter()
            .map(|directive| -> Result<(String, VolumeMode)> {
                let mapping: VolumeMapping = directive.parse()?;
                Ok((mapping.path, mapping.mode))
            })
            .collect()
    }

    // ---- paths ----

    /// Data folder of `slug` as seen by this process.
    pub fn path_data(&self, slug: &str) -> PathBuf {
        self.settings.addons_data.join(slug)
    }

    /// Data folder of `slug` as seen by the container runtime.
    pub fn path_extern_data(&self, slug: &str) -> PathBuf {
        self.settings.extern_addons_data.join(slug)
    }

    pub fn path_options(&self, slug: &str) -> PathBuf {
        self.path_data(slug).join(OPTIONS_FILENAME)
    }

    /// Source folder of `slug` in the current catalog.
    pub fn path_location(&self, slug: &str) -> Option<&std::path::Path> {
        self.catalog.get(slug).map(|addon| addon.location.as_path())
    }

    // ---- runtime options ----

    /// Validator for the installed option schema of `slug`.
    pub fn options_validator(&self, slug: &str) -> Result<OptionsValidator> {
        Ok(OptionsValidator::new(self.installed(slug)?.schema.clone()))
    }

    /// Validate the effective options of `slug` and write them for the runtime.
    ///
    /// Nothing is written when validation fails.
    pub fn write_options(&self, slug: &str) -> Result<()> {
        let options = self.options(slug)?;
        let normalized = match self.options_validator(slug)?.validate(&options) {
            Ok(normalized) => normalized,
            Err(source) => {
                error!("Addon {} has wrong options -> {}", slug, source);
                return Err(Error::OptionsValidation {
                    slug: slug.to_string(),
                    source,
                });
            }
        };
        write_json_atomic(&self.path_options(slug), &Value::Object(normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStateFile;
    use serde_json::json;

    fn addon(repository: &str, slug: &str, version: &str) -> AddonConfig {
        let mut config: AddonConfig = serde_json::from_value(json!({
            "name": format!("Addon {slug}"),
            "version": version,
            "slug": slug,
            "description": "from catalog",
            "startup": "after",
            "options": {"port": 80},
            "schema": {"port": "int"},
            "map": ["config:rw", "ssl"]
        }))
        .unwrap();
        config.repository = repository.to_string();
        config
    }

    fn store_with(catalog_entries: Vec<AddonConfig>) -> (AddonStore, MemoryStateFile) {
        let file = MemoryStateFile::new();
        let state = InstalledState::load(Box::new(file.clone())).unwrap();
        let mut store =
            AddonStore::with_state(StoreSettings::from_root("/srv/store"), Arch::Amd64, state);
        for entry in catalog_entries {
            store.catalog.insert(entry);
        }
        (store, file)
    }

    #[test]
    fn test_install_requires_catalog_entry() {
        let (mut store, file) = store_with(vec![]);
        let result = store.install("local_web", "1.0");
        assert!(matches!(result, Err(Error::NotInCatalog { .. })));
        assert_eq!(file.saves(), 0);
    }

    #[test]
    fn test_update_of_detached_addon_has_hint() {
        let (mut store, _file) = store_with(vec![addon("local", "web", "1.0")]);
        store.install("local_web", "1.0").unwrap();
        store.catalog = Catalog::new();

        let err = store.update("local_web", "1.1").unwrap_err();
        assert!(err.to_string().contains("detached"));
        assert_eq!(store.list_detached(), BTreeSet::from(["local_web".to_string()]));
    }

    #[test]
    fn test_descriptive_accessors_prefer_catalog() {
        let (mut store, _file) = store_with(vec![addon("local", "web", "1.0")]);
        store.install("local_web", "1.0").unwrap();

        let mut newer = addon("local", "web", "2.0");
        newer.description = "newer".to_string();
        store.catalog.insert(newer);

        assert_eq!(store.description("local_web"), Some("newer"));
        assert_eq!(store.last_version("local_web"), Some("2.0"));
        assert!(store.has_update("local_web"));

        store.catalog = Catalog::new();
        assert_eq!(store.description("local_web"), Some("from catalog"));
        assert_eq!(store.last_version("local_web"), Some("1.0"));
        assert!(!store.has_update("local_web"));
        assert_eq!(store.name("local_missing"), None);
    }

    #[test]
    fn test_image_from_template() {
        let mut config = addon("core", "foo", "1.0");
        config.image = Some("vendor/{arch}-foo".to_string());
        let (store, _file) = store_with(vec![config]);

        assert_eq!(store.image("core_foo").unwrap(), "vendor/amd64-foo");
        assert!(!store.needs_build("core_foo").unwrap());
    }

    #[test]
    fn test_image_for_local_build() {
        let (store, _file) = store_with(vec![addon("local", "bar", "1.0")]);
        assert_eq!(store.image("local_bar").unwrap(), "local/amd64-addon-bar");
        assert!(store.needs_build("local_bar").unwrap());
        assert!(matches!(
            store.image("local_nope"),
            Err(Error::UnknownAddon { .. })
        ));
    }

    #[test]
    fn test_map_volumes() {
        let (mut store, _file) = store_with(vec![addon("local", "web", "1.0")]);
        store.install("local_web", "1.0").unwrap();

        let volumes = store.map_volumes("local_web").unwrap();
        assert_eq!(volumes.get("config"), Some(&VolumeMode::Rw));
        assert_eq!(volumes.get("ssl"), Some(&VolumeMode::Ro));
    }

    #[test]
    fn test_set_options_rejects_invalid_without_save() {
        let (mut store, file) = store_with(vec![addon("local", "web", "1.0")]);
        store.install("local_web", "1.0").unwrap();

        let mut bad = Map::new();
        bad.insert("port".to_string(), json!("http"));
        let err = store.set_options("local_web", bad).unwrap_err();
        assert!(matches!(err, Error::OptionsValidation { .. }));
        assert_eq!(file.saves(), 1);
        assert!(store.state().user("local_web").unwrap().options.is_empty());
    }

    #[test]
    fn test_set_options_stores_normalized() {
        let (mut store, _file) = store_with(vec![addon("local", "web", "1.0")]);
        store.install("local_web", "1.0").unwrap();

        let mut options = Map::new();
        options.insert("port".to_string(), json!("8080"));
        store.set_options("local_web", options).unwrap();
        assert_eq!(store.options("local_web").unwrap()["port"], json!(8080));
    }

    #[test]
    fn test_paths() {
        let (store, _file) = store_with(vec![]);
        assert_eq!(
            store.path_options("local_web"),
            PathBuf::from("/srv/store/addons/data/local_web/options.json")
        );
        assert_eq!(
            store.path_extern_data("local_web"),
            PathBuf::from("/srv/store/addons/data/local_web")
        );
    }

    #[test]
    fn test_list_all_unions_catalog_and_installed() {
        let (mut store, _file) = store_with(vec![addon("local", "web", "1.0")]);
        store.install("local_web", "1.0").unwrap();
        store.catalog = Catalog::new();
        store.catalog.insert(addon("core", "ssh", "1.0"));

        assert_eq!(
            store.list_all(),
            BTreeSet::from(["core_ssh".to_string(), "local_web".to_string()])
        );
        assert!(store.exists("local_web"));
        assert!(store.exists("core_ssh"));
        assert!(!store.exists("core_nope"));
    }
}
