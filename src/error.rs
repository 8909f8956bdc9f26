//! # Error Handling
//!
//! This module defines the centralized error type for the `addon-store`
//! library. It uses the `thiserror` library to create a single `Error` enum
//! covering every anticipated failure mode, with messages that name the addon
//! slug or file path involved.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the library.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! ## Recovery Policy
//!
//! Not every variant reaches the caller. The catalog scanner builds
//! `SourceRead` and `SchemaValidation` errors for individual definition files
//! and repository configs, logs them, records them as scan warnings, and moves
//! on to the next file. Everything else is surfaced: `NotInCatalog` aborts an
//! install or update before any state is touched, and `OptionsValidation`
//! aborts an options write before anything is stored or written.

use std::path::PathBuf;

use thiserror::Error;

use crate::options::OptionsError;

/// Main error type for addon-store operations
#[derive(Error, Debug)]
pub enum Error {
    /// A definition file or repository config could not be read or parsed.
    #[error("Can't read {}: {message}", path.display())]
    SourceRead { path: PathBuf, message: String },

    /// A definition file or repository config parsed but violates its schema.
    ///
    /// The message starts with the offending field path.
    #[error("Schema validation failed for {}: {message}", path.display())]
    SchemaValidation { path: PathBuf, message: String },

    /// User-submitted (or merged) options failed the addon's option schema.
    #[error("Addon {slug} has invalid options: {source}")]
    OptionsValidation {
        slug: String,
        #[source]
        source: OptionsError,
    },

    /// An install or update referenced a slug missing from the catalog.
    #[error("Addon {slug} is not available in any repository{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    NotInCatalog {
        slug: String,
        /// Optional hint, e.g. when the addon is installed but detached
        hint: Option<String>,
    },

    /// An operation that needs an installed addon was given one that is not.
    #[error("Addon {slug} is not installed")]
    NotInstalled { slug: String },

    /// The slug is neither installed nor present in the catalog.
    #[error("Unknown addon {slug}")]
    UnknownAddon { slug: String },

    /// An installed addon's frozen definition lacks a field a query needs.
    #[error("Orphaned addon detected {slug}: missing {field}")]
    OrphanedAddon { slug: String, field: String },

    /// A volume directive did not match `path[:mode]`.
    #[error("Invalid volume mapping: {directive}")]
    VolumeMapping { directive: String },

    /// The persisted state file could not be loaded or written.
    #[error("State file error for {}: {message}", path.display())]
    StateFile { path: PathBuf, message: String },

    /// Store settings could not be loaded.
    #[error("Settings error: {message}")]
    Settings { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
