//! Per-invocation method configuration.
//!
//! A [`MethodConfig`] is an ordered key/value map. Each method reads the keys
//! it understands and rejects missing or mistyped required keys with
//! [`ChromrecError::Configuration`] before doing any work.

use std::collections::BTreeMap;

use chromrec_core::{ChromrecError, Result};

use crate::method::MethodSpec;

/// A single configuration value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Ordered `(method, config)` pairs for an ensemble.
    Methods(Vec<MethodSpec>),
    /// Row-major numeric matrix, e.g. a Sankoff cost matrix.
    Matrix(Vec<Vec<f64>>),
    /// Opaque nested settings, e.g. sampler parameters.
    Table(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "a boolean",
            Self::Integer(_) => "an integer",
            Self::Float(_) => "a float",
            Self::Text(_) => "a string",
            Self::Methods(_) => "a method list",
            Self::Matrix(_) => "a matrix",
            Self::Table(_) => "a table",
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for ConfigValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for ConfigValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<MethodSpec>> for ConfigValue {
    fn from(specs: Vec<MethodSpec>) -> Self {
        Self::Methods(specs)
    }
}

impl From<Vec<Vec<f64>>> for ConfigValue {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Self::Matrix(rows)
    }
}

impl From<BTreeMap<String, ConfigValue>> for ConfigValue {
    fn from(table: BTreeMap<String, ConfigValue>) -> Self {
        Self::Table(table)
    }
}

/// Configuration for one method invocation.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct MethodConfig {
    entries: BTreeMap<String, ConfigValue>,
}

impl MethodConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Option<ConfigValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// A key `method` cannot run without.
    pub(crate) fn require(&self, key: &str, method: &str) -> Result<&ConfigValue> {
        self.get(key).ok_or_else(|| {
            ChromrecError::Configuration(format!(
                "{} requires a '{}' key in its config",
                method, key
            ))
        })
    }

    /// Optional string key; present values of another type are rejected.
    pub(crate) fn text(&self, key: &str, method: &str) -> Result<Option<&str>> {
        match self.get(key) {
            None => Ok(None),
            Some(ConfigValue::Text(s)) => Ok(Some(s)),
            Some(other) => Err(ChromrecError::Configuration(format!(
                "{} expects '{}' to be a string, got {}",
                method,
                key,
                other.kind()
            ))),
        }
    }
}
