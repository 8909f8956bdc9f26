//! Definition parsing tests using datatest-stable for test data discovery
//!
//! This test suite uses datatest-stable to automatically discover and test
//! addon definition files in the testdata directory. Each JSON file is tested
//! to ensure it loads, validates, and that its option defaults pass its own
//! option schema.

use addon_store::config::load_addon_config;
use addon_store::options::OptionsValidator;
use std::path::Path;

/// Test that an addon definition loads successfully
///
/// This test is automatically run for each JSON file in the testdata directory.
/// It verifies that:
/// 1. The file can be read and parsed
/// 2. The definition passes schema validation
/// 3. Every volume directive parses
/// 4. The option defaults validate against the option schema
fn test_definition_parsing(path: &Path) -> datatest_stable::Result<()> {
    let config = load_addon_config(path)
        .map_err(|e| format!("Failed to load definition {}: {}", path.display(), e))?;

    assert!(
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| stem == config.slug),
        "Definition {} should be named after its slug {}",
        path.display(),
        config.slug
    );
    assert!(config.startup.is_some());
    assert!(!config.arch.is_empty());

    for directive in &config.map {
        directive
            .parse::<addon_store::config::VolumeMapping>()
            .map_err(|e| format!("Bad volume in {}: {}", path.display(), e))?;
    }

    let validator = OptionsValidator::new(config.schema.clone());
    validator
        .validate(&config.options)
        .map_err(|e| format!("Defaults of {} do not validate: {}", path.display(), e))?;

    Ok(())
}

// Register datatest harness to discover and run tests on all JSON files in testdata directory
datatest_stable::harness!(
    test_definition_parsing,
    "tests/testdata/definitions",
    r".*\.json$"
);
