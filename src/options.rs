//! # Addon Options Validation
//!
//! Every addon declares the shape of its user-facing options in the `schema`
//! field of its definition file. The description is declarative JSON:
//!
//! ```json
//! {
//!   "log_level": "str",
//!   "port": "int",
//!   "ratio": "float",
//!   "ssl": "bool",
//!   "api_key": "password",
//!   "hosts": ["str"],
//!   "servers": [{ "host": "str", "port": "int" }],
//!   "mqtt": { "user": "str", "password": "password" }
//! }
//! ```
//!
//! The description is parsed once into an [`OptionsSchema`] made of
//! [`OptionType`] descriptors. An [`OptionsValidator`] built from it checks a
//! user-submitted option set and returns a normalized copy, coercing scalar
//! values into the declared type where that is unambiguous (`"8080"` for an
//! `int`, `"yes"` for a `bool`).
//!
//! Failures carry the path of the offending value, e.g. `servers[1].port`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Scalar option kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Str,
    Int,
    Float,
    Bool,
}

impl Primitive {
    fn keyword(self) -> &'static str {
        match self {
            Primitive::Str => "str",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
        }
    }
}

/// Keyword of the free-form passthrough type.
const FREE_FORM: &str = "password";

/// A single option-type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionType {
    Primitive(Primitive),
    /// Homogeneous list; written as a one-element array in the description.
    ListOf(Box<OptionType>),
    Nested(OptionsSchema),
    /// Accepted as is (secrets and other opaque values).
    FreeForm,
}

impl OptionType {
    /// Parse a descriptor found at `path` in a schema description.
    pub fn parse(value: &Value, path: &str) -> std::result::Result<Self, String> {
        match value {
            Value::String(keyword) => match keyword.as_str() {
                "str" => Ok(OptionType::Primitive(Primitive::Str)),
                "int" => Ok(OptionType::Primitive(Primitive::Int)),
                "float" => Ok(OptionType::Primitive(Primitive::Float)),
                "bool" => Ok(OptionType::Primitive(Primitive::Bool)),
                FREE_FORM => Ok(OptionType::FreeForm),
                other => Err(format!("{path}: unknown option type \"{other}\"")),
            },
            Value::Array(items) => match items.as_slice() {
                [element] => Ok(OptionType::ListOf(Box::new(OptionType::parse(
                    element,
                    &format!("{path}[0]"),
                )?))),
                _ => Err(format!(
                    "{path}: a list type takes exactly one element type, found {}",
                    items.len()
                )),
            },
            Value::Object(fields) => Ok(OptionType::Nested(OptionsSchema::parse(fields, path)?)),
            other => Err(format!(
                "{path}: expected an option type, found {}",
                describe(other)
            )),
        }
    }

    /// Render back into the declarative form.
    pub fn to_value(&self) -> Value {
        match self {
            OptionType::Primitive(kind) => Value::String(kind.keyword().to_string()),
            OptionType::ListOf(element) => Value::Array(vec![element.to_value()]),
            OptionType::Nested(schema) => Value::Object(schema.to_map()),
            OptionType::FreeForm => Value::String(FREE_FORM.to_string()),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Primitive(kind) => f.write_str(kind.keyword()),
            OptionType::ListOf(element) => write!(f, "list of {element}"),
            OptionType::Nested(_) => f.write_str("mapping"),
            OptionType::FreeForm => f.write_str(FREE_FORM),
        }
    }
}

/// Option name to descriptor, as declared in an addon's `schema` field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct OptionsSchema(BTreeMap<String, OptionType>);

impl OptionsSchema {
    fn parse(fields: &Map<String, Value>, prefix: &str) -> std::result::Result<Self, String> {
        let mut types = BTreeMap::new();
        for (name, descriptor) in fields {
            let path = join_key(prefix, name);
            types.insert(name.clone(), OptionType::parse(descriptor, &path)?);
        }
        Ok(Self(types))
    }

    fn to_map(&self) -> Map<String, Value> {
        self.0
            .iter()
            .map(|(name, descriptor)| (name.clone(), descriptor.to_value()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&OptionType> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionType)> {
        self.0.iter()
    }
}

impl TryFrom<Map<String, Value>> for OptionsSchema {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        OptionsSchema::parse(&fields, "schema")
    }
}

impl From<OptionsSchema> for Map<String, Value> {
    fn from(schema: OptionsSchema) -> Self {
        schema.to_map()
    }
}

/// Why an option set was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptionsError {
    #[error("{path}: unknown option")]
    Unknown { path: String },

    #[error("{path}: expected {expected}, got {found}")]
    Type {
        path: String,
        expected: String,
        found: String,
    },
}

impl OptionsError {
    pub fn new(path: impl Into<String>, expected: impl Into<String>, found: impl Into<String>) -> Self {
        OptionsError::Type {
            path: path.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Path of the offending option.
    pub fn path(&self) -> &str {
        match self {
            OptionsError::Unknown { path } | OptionsError::Type { path, .. } => path,
        }
    }
}

/// Validator compiled from an addon's option schema.
#[derive(Debug, Clone)]
pub struct OptionsValidator {
    schema: OptionsSchema,
}

impl OptionsValidator {
    pub fn new(schema: OptionsSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &OptionsSchema {
        &self.schema
    }

    /// Validate `options` and return the normalized copy.
    ///
    /// Every key must be declared. Declared keys may be absent.
    pub fn validate(
        &self,
        options: &Map<String, Value>,
    ) -> std::result::Result<Map<String, Value>, OptionsError> {
        validate_mapping(&self.schema, options, "")
    }
}

fn validate_mapping(
    schema: &OptionsSchema,
    options: &Map<String, Value>,
    prefix: &str,
) -> std::result::Result<Map<String, Value>, OptionsError> {
    let mut normalized = Map::new();
    for (key, value) in options {
        let path = join_key(prefix, key);
        let Some(descriptor) = schema.get(key) else {
            return Err(OptionsError::Unknown { path });
        };
        normalized.insert(key.clone(), validate_value(descriptor, value, &path)?);
    }
    Ok(normalized)
}

fn validate_value(
    descriptor: &OptionType,
    value: &Value,
    path: &str,
) -> std::result::Result<Value, OptionsError> {
    let mismatch = || OptionsError::new(path, descriptor.to_string(), describe(value));

    match descriptor {
        OptionType::FreeForm => Ok(value.clone()),
        OptionType::Primitive(kind) => coerce(*kind, value).ok_or_else(mismatch),
        OptionType::ListOf(element) => {
            let items = value.as_array().ok_or_else(mismatch)?;
            items
                .iter()
                .enumerate()
                .map(|(index, item)| validate_value(element, item, &format!("{path}[{index}]")))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        OptionType::Nested(schema) => {
            let fields = value.as_object().ok_or_else(mismatch)?;
            validate_mapping(schema, fields, path).map(Value::Object)
        }
    }
}

/// 2^63, the first integral float that does not fit in an i64.
const I64_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn coerce(kind: Primitive, value: &Value) -> Option<Value> {
    match kind {
        Primitive::Str => match value {
            Value::String(_) => Some(value.clone()),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
        Primitive::Int => match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Value::from(i))
                } else {
                    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < I64_UPPER_BOUND)
                        .map(|f| Value::from(f as i64))
                }
            }
            Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
            _ => None,
        },
        Primitive::Float => match value {
            Value::Number(n) => n.as_f64().and_then(Number::from_f64).map(Value::Number),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            _ => None,
        },
        Primitive::Bool => match value {
            Value::Bool(_) => Some(value.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Some(Value::Bool(false)),
                Some(1) => Some(Value::Bool(true)),
                _ => None,
            },
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" | "enable" => Some(Value::Bool(true)),
                "0" | "false" | "no" | "off" | "disable" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        },
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Short description of a value for diagnostics.
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Array(_) => "a list".to_string(),
        Value::Object(_) => "a mapping".to_string(),
        scalar => scalar.to_string(),
    }
}
