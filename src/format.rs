//! JSON and TOML adapters for [`ConfigTree`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;
use crate::tree::{ConfigTree, ConfigValue};

/// On-disk format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFormat::Json => write!(f, "JSON"),
            ConfigFormat::Toml => write!(f, "TOML"),
        }
    }
}

/// Parses `text` into a tree.
///
/// Empty or whitespace-only input is "no prior configuration" and yields an empty tree.
pub fn parse(text: &str, format: ConfigFormat) -> Result<ConfigTree, FormatError> {
    if text.trim().is_empty() {
        return Ok(ConfigTree::new());
    }
    match format {
        ConfigFormat::Json => parse_json(text),
        ConfigFormat::Toml => parse_toml(text),
    }
}

/// Serializes `tree` in `format`. Never drops or invents keys.
pub fn serialize(tree: &ConfigTree, format: ConfigFormat) -> Result<String, FormatError> {
    match format {
        ConfigFormat::Json => serialize_json(tree),
        ConfigFormat::Toml => serialize_toml(tree),
    }
}

fn parse_json(text: &str) -> Result<ConfigTree, FormatError> {
    match serde_json::from_str::<serde_json::Value>(text)? {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| (key, from_json(value)))
            .collect()),
        other => Err(FormatError::RootNotTable {
            format: ConfigFormat::Json,
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn from_json(value: serde_json::Value) -> ConfigValue {
    match value {
        serde_json::Value::Null => ConfigValue::Null,
        serde_json::Value::Bool(b) => ConfigValue::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                ConfigValue::Integer(i)
            } else if let Some(u) = n.as_u64() {
                ConfigValue::UInt(u)
            } else {
                ConfigValue::Float(n.as_f64().unwrap_or_default())
            }
        }
        serde_json::Value::String(s) => ConfigValue::String(s),
        serde_json::Value::Array(items) => {
            ConfigValue::Array(items.into_iter().map(from_json).collect())
        }
        serde_json::Value::Object(map) => ConfigValue::Table(
            map.into_iter()
                .map(|(key, value)| (key, from_json(value)))
                .collect(),
        ),
    }
}

fn serialize_json(tree: &ConfigTree) -> Result<String, FormatError> {
    let root = json_table(tree, "")?;
    let mut text = serde_json::to_string_pretty(&serde_json::Value::Object(root)).map_err(
        |err| FormatError::Serialize {
            format: ConfigFormat::Json,
            message: err.to_string(),
        },
    )?;
    text.push('\n');
    Ok(text)
}

fn json_table(
    tree: &ConfigTree,
    prefix: &str,
) -> Result<serde_json::Map<String, serde_json::Value>, FormatError> {
    tree.iter()
        .map(|(key, value)| {
            let converted = to_json(value, &child_path(prefix, key))?;
            Ok::<_, FormatError>((key.clone(), converted))
        })
        .collect()
}

fn to_json(value: &ConfigValue, path: &str) -> Result<serde_json::Value, FormatError> {
    Ok(match value {
        ConfigValue::Null => serde_json::Value::Null,
        ConfigValue::Bool(b) => serde_json::Value::Bool(*b),
        ConfigValue::Integer(i) => serde_json::Value::from(*i),
        ConfigValue::UInt(u) => serde_json::Value::from(*u),
        ConfigValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| FormatError::Unrepresentable {
                format: ConfigFormat::Json,
                path: path.to_string(),
                reason: format!("non-finite number {f}"),
            })?,
        ConfigValue::String(s) | ConfigValue::Datetime(s) => serde_json::Value::String(s.clone()),
        ConfigValue::Array(items) => serde_json::Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| to_json(item, &format!("{path}[{idx}]")))
                .collect::<Result<_, _>>()?,
        ),
        ConfigValue::Table(table) => serde_json::Value::Object(json_table(table, path)?),
    })
}

fn parse_toml(text: &str) -> Result<ConfigTree, FormatError> {
    let table: toml::Table = toml::from_str(text)?;
    Ok(table
        .into_iter()
        .map(|(key, value)| (key, from_toml(value)))
        .collect())
}

fn from_toml(value: toml::Value) -> ConfigValue {
    match value {
        toml::Value::String(s) => ConfigValue::String(s),
        toml::Value::Integer(i) => ConfigValue::Integer(i),
        toml::Value::Float(f) => ConfigValue::Float(f),
        toml::Value::Boolean(b) => ConfigValue::Bool(b),
        toml::Value::Datetime(dt) => ConfigValue::Datetime(dt.to_string()),
        toml::Value::Array(items) => {
            ConfigValue::Array(items.into_iter().map(from_toml).collect())
        }
        toml::Value::Table(table) => ConfigValue::Table(
            table
                .into_iter()
                .map(|(key, value)| (key, from_toml(value)))
                .collect(),
        ),
    }
}

fn serialize_toml(tree: &ConfigTree) -> Result<String, FormatError> {
    let root = toml_table(tree, "")?;
    Ok(toml::to_string_pretty(&root)?)
}

fn toml_table(tree: &ConfigTree, prefix: &str) -> Result<toml::Table, FormatError> {
    tree.iter()
        .map(|(key, value)| {
            let converted = to_toml(value, &child_path(prefix, key))?;
            Ok::<_, FormatError>((key.clone(), converted))
        })
        .collect()
}

fn to_toml(value: &ConfigValue, path: &str) -> Result<toml::Value, FormatError> {
    let unrepresentable = |reason: String| FormatError::Unrepresentable {
        format: ConfigFormat::Toml,
        path: path.to_string(),
        reason,
    };
    Ok(match value {
        ConfigValue::Null => return Err(unrepresentable("TOML has no null value".to_string())),
        ConfigValue::Bool(b) => toml::Value::Boolean(*b),
        ConfigValue::Integer(i) => toml::Value::Integer(*i),
        ConfigValue::UInt(u) => toml::Value::Integer(
            i64::try_from(*u)
                .map_err(|_| unrepresentable(format!("integer {u} exceeds the TOML range")))?,
        ),
        ConfigValue::Float(f) => toml::Value::Float(*f),
        ConfigValue::String(s) => toml::Value::String(s.clone()),
        ConfigValue::Datetime(s) => toml::Value::Datetime(
            s.parse::<toml::value::Datetime>()
                .map_err(|err| unrepresentable(format!("invalid datetime `{s}`: {err}")))?,
        ),
        ConfigValue::Array(items) => toml::Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| to_toml(item, &format!("{path}[{idx}]")))
                .collect::<Result<_, _>>()?,
        ),
        ConfigValue::Table(table) => toml::Value::Table(toml_table(table, path)?),
    })
}

fn child_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
