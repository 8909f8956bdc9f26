//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a fixture that lays out a store root on disk the way
//! `StoreSettings::from_root` expects it, plus snippets for addon and
//! repository definitions.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = StoreFixture::new().with_core_addon("ssh", "1.0");
//!     fixture.command().arg("list").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

use addon_store::settings::StoreSettings;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::definitions;
    pub use super::StoreFixture;
}

/// Addon and repository definition snippets.
#[allow(dead_code)]
pub mod definitions {
    use serde_json::{json, Value};

    /// Smallest definition that passes validation.
    pub fn addon(slug: &str, version: &str) -> Value {
        json!({
            "name": format!("Addon {slug}"),
            "version": version,
            "slug": slug,
            "description": format!("The {slug} addon"),
            "startup": "before",
            "boot": "auto",
            "options": {},
            "schema": {}
        })
    }

    /// Definition with option defaults, a schema, ports and volumes.
    pub fn addon_with_options(slug: &str, version: &str) -> Value {
        json!({
            "name": format!("Addon {slug}"),
            "version": version,
            "slug": slug,
            "description": format!("The {slug} addon"),
            "startup": "after",
            "boot": "auto",
            "options": {"port": 22, "users": []},
            "schema": {"port": "int", "users": [{"name": "str", "admin": "bool"}]},
            "ports": {"22/tcp": 2222},
            "map": ["config:rw", "ssl"],
            "image": "example/{arch}-addon-ssh"
        })
    }

    /// Repository metadata for an external repository.
    pub fn repository(name: &str) -> Value {
        json!({
            "name": name,
            "url": "https://example.com/addons",
            "maintainer": "Example Maintainer"
        })
    }
}

/// A temporary store root populated with addon definitions.
pub struct StoreFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl StoreFixture {
    /// Create a new fixture with an empty store root.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `content` to `path`, relative to the store root.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Write a definition to `<folder>/<dir>/config.json`.
    pub fn with_definition(self, folder: &str, dir: &str, definition: serde_json::Value) -> Self {
        let path = format!("{folder}/{dir}/config.json");
        self.with_file(&path, &definition.to_string())
    }

    /// Add a minimal core addon.
    pub fn with_core_addon(self, slug: &str, version: &str) -> Self {
        self.with_definition("addons/core", slug, definitions::addon(slug, version))
    }

    /// Add a minimal local addon.
    pub fn with_local_addon(self, slug: &str, version: &str) -> Self {
        self.with_definition("addons/local", slug, definitions::addon(slug, version))
    }

    /// Add an external repository folder with its `repository.json`.
    pub fn with_repository(self, dir: &str, name: &str) -> Self {
        let path = format!("addons/git/{dir}/repository.json");
        self.with_file(&path, &definitions::repository(name).to_string())
    }

    /// Add a minimal addon inside an external repository folder.
    pub fn with_repository_addon(self, dir: &str, slug: &str, version: &str) -> Self {
        let folder = format!("addons/git/{dir}");
        self.with_definition(&folder, slug, definitions::addon(slug, version))
    }

    /// Get the path to the store root.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Settings derived from the store root.
    pub fn settings(&self) -> StoreSettings {
        StoreSettings::from_root(self.path())
    }

    /// Path of the persisted state document.
    pub fn state_file(&self) -> PathBuf {
        self.settings().state_file
    }

    /// Create a child path in the store root.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command pointed at this store root for a fixed architecture.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("addon-store");
        cmd.env_remove("RUST_LOG")
            .env("ADDON_STORE_ARCH", "amd64")
            .arg("--root")
            .arg(self.path());
        cmd
    }
}

impl Default for StoreFixture {
    fn default() -> Self {
        Self::new()
    }
}
