//! Property-based tests for the volume grammar and options validation.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::config::{VolumeMapping, VolumeMode};
    use crate::options::{OptionsSchema, OptionsValidator};
    use proptest::prelude::*;
    use serde_json::{json, Map, Value};

    // ============================================================================
    // VolumeMapping property tests
    // ============================================================================

    proptest! {
        /// Property: a bare path maps read-only to itself
        #[test]
        fn bare_path_defaults_to_ro(path in "[^:]{1,40}") {
            let mapping: VolumeMapping = path.parse().unwrap();
            prop_assert_eq!(mapping.path, path);
            prop_assert_eq!(mapping.mode, VolumeMode::Ro);
        }

        /// Property: an explicit mode is kept and stripped from the path
        #[test]
        fn explicit_mode_is_kept(path in "[^:]{1,40}", rw in any::<bool>()) {
            let mode = if rw { "rw" } else { "ro" };
            let mapping: VolumeMapping = format!("{path}:{mode}").parse().unwrap();
            prop_assert_eq!(mapping.path, path);
            prop_assert_eq!(mapping.mode.to_string(), mode);
        }

        /// Property: parsing never panics, whatever the input
        #[test]
        fn parse_never_panics(input in ".*") {
            let _ = input.parse::<VolumeMapping>();
        }

        /// Property: anything after a colon other than ro/rw is rejected
        #[test]
        fn unknown_mode_is_rejected(path in "[^:]{1,20}", mode in "[a-z]{1,4}") {
            prop_assume!(mode != "ro" && mode != "rw");
            let directive = format!("{path}:{mode}");
            prop_assert!(directive.parse::<VolumeMapping>().is_err());
        }
    }

    // ============================================================================
    // OptionsValidator property tests
    // ============================================================================

    fn validator() -> OptionsValidator {
        let schema: OptionsSchema = serde_json::from_value(json!({
            "port": "int",
            "name": "str",
            "ratio": "float",
            "hosts": ["str"]
        }))
        .unwrap();
        OptionsValidator::new(schema)
    }

    proptest! {
        /// Property: integers and their decimal strings normalize identically
        #[test]
        fn int_and_int_string_agree(n in any::<i64>()) {
            let v = validator();
            let mut as_number = Map::new();
            as_number.insert("port".to_string(), json!(n));
            let mut as_string = Map::new();
            as_string.insert("port".to_string(), json!(n.to_string()));

            prop_assert_eq!(v.validate(&as_number).unwrap(), v.validate(&as_string).unwrap());
        }

        /// Property: validation is idempotent on its own output
        #[test]
        fn validation_is_idempotent(
            port in any::<i32>(),
            name in ".{0,20}",
            hosts in proptest::collection::vec("[a-z.]{1,10}", 0..5),
        ) {
            let v = validator();
            let mut options = Map::new();
            options.insert("port".to_string(), json!(port));
            options.insert("name".to_string(), Value::String(name));
            options.insert("hosts".to_string(), json!(hosts));

            let once = v.validate(&options).unwrap();
            let twice = v.validate(&once).unwrap();
            prop_assert_eq!(once, twice);
        }

        /// Property: undeclared keys are always rejected with their own path
        #[test]
        fn undeclared_key_is_rejected(key in "[a-z_]{1,12}") {
            prop_assume!(!["port", "name", "ratio", "hosts"].contains(&key.as_str()));
            let mut options = Map::new();
            options.insert(key.clone(), json!(1));
            let err = validator().validate(&options).unwrap_err();
            prop_assert_eq!(err.path(), key.as_str());
        }
    }
}
