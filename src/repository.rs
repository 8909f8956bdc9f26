//! # Repository Registry
//!
//! Descriptive records for every repository that contributed addons to the
//! current catalog. The registry is rebuilt together with the catalog and is
//! read-only afterwards.
//!
//! ## Sources of Records
//!
//! - **Built-in repositories** (`core` and `local`): their records come from a
//!   table bundled into the binary (`built-in.json`). A built-in record is
//!   only registered when at least one addon carrying that tag was found, so
//!   an empty built-in repository is never advertised.
//!
//! - **External repositories**: one per subdirectory of the repositories
//!   root, described by that directory's `repository.json`. The repository
//!   slug is not stored in the file; it is derived from the directory by a
//!   [`RepositorySlugRule`] supplied by the caller, which is how the process
//!   that checks repositories out stays in charge of their identity.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::RepositoryConfig;
use crate::error::Result;

const BUILTIN_TABLE: &str = include_str!("built-in.json");

/// Display record for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,
}

impl RepositoryInfo {
    pub fn from_config(slug: &str, config: RepositoryConfig) -> Self {
        Self {
            slug: slug.to_string(),
            name: config.name,
            url: config.url,
            maintainer: config.maintainer,
        }
    }
}

/// Parse the bundled table of built-in repository records.
pub fn builtin_repositories() -> Result<BTreeMap<String, RepositoryInfo>> {
    Ok(serde_json::from_str(BUILTIN_TABLE)?)
}

/// Known repositories in registration order.
#[derive(Debug, Clone, Default)]
pub struct RepositoryRegistry {
    entries: Vec<RepositoryInfo>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `info`, replacing any record with the same slug in place.
    pub fn insert(&mut self, info: RepositoryInfo) {
        match self.entries.iter_mut().find(|entry| entry.slug == info.slug) {
            Some(existing) => *existing = info,
            None => self.entries.push(info),
        }
    }

    pub fn get(&self, slug: &str) -> Option<&RepositoryInfo> {
        self.entries.iter().find(|entry| entry.slug == slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.get(slug).is_some()
    }

    pub fn list(&self) -> &[RepositoryInfo] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derives an external repository's slug from its checkout directory.
///
/// Returning `None` makes the scanner skip the directory.
pub trait RepositorySlugRule {
    fn repository_slug(&self, path: &Path) -> Option<String>;
}

/// Uses the directory name unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryName;

impl RepositorySlugRule for DirectoryName {
    fn repository_slug(&self, path: &Path) -> Option<String> {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
    }
}

impl<F> RepositorySlugRule for F
where
    F: Fn(&Path) -> Option<String>,
{
    fn repository_slug(&self, path: &Path) -> Option<String> {
        self(path)
    }
}
