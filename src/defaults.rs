//! Default values for addon-store configuration.
//!
//! This module provides centralized file names and default locations used
//! across the library and the commands, ensuring consistency and avoiding
//! duplication.

use std::path::PathBuf;

/// File name of an addon definition, searched at any depth.
pub const ADDON_CONFIG_FILENAME: &str = "config.json";

/// File name of the config at the root of each external repository.
pub const REPOSITORY_CONFIG_FILENAME: &str = "repository.json";

/// File name of the generated runtime options inside an addon's data folder.
pub const OPTIONS_FILENAME: &str = "options.json";

/// File name of the persisted installed-state document.
pub const STATE_FILENAME: &str = "addons.json";

/// Repository tag of the built-in core addons.
pub const REPOSITORY_CORE: &str = "core";

/// Repository tag of user-provided local addons.
pub const REPOSITORY_LOCAL: &str = "local";

/// Environment variable overriding the store root directory.
pub const ROOT_ENV: &str = "ADDON_STORE_ROOT";

/// Environment variable overriding the detected architecture.
pub const ARCH_ENV: &str = "ADDON_STORE_ARCH";

/// Returns the default store root directory.
///
/// Uses the platform-appropriate data directory:
/// - Linux: `~/.local/share/addon-store` (XDG Base Directory)
/// - macOS: `~/Library/Application Support/addon-store`
/// - Windows: `{FOLDERID_RoamingAppData}\addon-store`
///
/// Falls back to `.addon-store` in the current directory if the platform
/// data directory cannot be determined.
///
/// This can be overridden by the `--root` CLI flag or the
/// `ADDON_STORE_ROOT` environment variable.
pub fn default_root() -> PathBuf {
    root_under(dirs::data_dir())
}

fn root_under(data_dir: Option<PathBuf>) -> PathBuf {
    match data_dir {
        Some(dir) => dir.join("addon-store"),
        None => PathBuf::from(".addon-store"),
    }
}
