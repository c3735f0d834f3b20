//! Format-independent configuration tree.
//!
//! Every supported file format parses into a [`ConfigTree`], an insertion-ordered map of
//! [`ConfigValue`]s. Keys keep the order they had in the source document so that a file
//! written back after an edit only differs where the edit happened.

use indexmap::IndexMap;

/// One level of a parsed configuration document.
pub type ConfigTree = IndexMap<String, ConfigValue>;

/// A single value inside a [`ConfigTree`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// JSON `null`; TOML has no equivalent
    Null,
    Bool(bool),
    Integer(i64),
    /// JSON integer above `i64::MAX`
    UInt(u64),
    Float(f64),
    String(String),
    /// TOML offset/local date-time in its RFC 3339 text form
    Datetime(String),
    Array(Vec<ConfigValue>),
    Table(ConfigTree),
}

impl ConfigValue {
    pub fn empty_table() -> Self {
        ConfigValue::Table(ConfigTree::new())
    }

    /// Human readable name of the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Integer(_) | ConfigValue::UInt(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::Datetime(_) => "datetime",
            ConfigValue::Array(_) => "array",
            ConfigValue::Table(_) => "table",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the string content when it is non-empty after trimming.
    pub fn as_non_empty_str(&self) -> Option<&str> {
        self.as_str().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Integer(i) => Some(*i as f64),
            ConfigValue::UInt(u) => Some(*u as f64),
            ConfigValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<ConfigValue>> {
        match self {
            ConfigValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&ConfigTree> {
        match self {
            ConfigValue::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut ConfigTree> {
        match self {
            ConfigValue::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, ConfigValue::Table(_))
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<u64> for ConfigValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(small) => ConfigValue::Integer(small),
            Err(_) => ConfigValue::UInt(value),
        }
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<ConfigTree> for ConfigValue {
    fn from(value: ConfigTree) -> Self {
        ConfigValue::Table(value)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(value: Vec<ConfigValue>) -> Self {
        ConfigValue::Array(value)
    }
}

impl From<Vec<&str>> for ConfigValue {
    fn from(value: Vec<&str>) -> Self {
        ConfigValue::Array(value.into_iter().map(ConfigValue::from).collect())
    }
}
