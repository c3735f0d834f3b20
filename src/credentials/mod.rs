//! Locating the API key and endpoint a tool is configured to use.
//!
//! Each tool stores credentials differently: inline environment variables, a keyed map in the
//! settings file, or a separate auth file. A per-tool [`CredentialExtractor`] turns those into
//! a uniform list of [`CredentialEntry`] values and [`resolve`] picks one of them.

pub mod extract;
pub mod write;

use std::collections::HashMap;

use secrecy::SecretString;

use crate::discovery::ApiDialect;
use crate::error::CredentialWriteError;
use crate::schema::{self, AuxiliaryRole, ToolId};
use crate::tree::ConfigTree;

/// Lists every usable credential found in a tool's primary tree and auxiliary files.
///
/// Entries without a key are never returned.
pub type CredentialExtractor = fn(&ConfigTree, &AuxiliaryTrees) -> Vec<CredentialEntry>;

/// Stores one provider's API key in a parsed auth file, keeping every other entry.
///
/// An empty key removes the provider's key.
pub type CredentialWriter = fn(&mut ConfigTree, &str, &str) -> Result<(), CredentialWriteError>;

/// One API key together with where and how to use it.
#[derive(Debug, Clone)]
pub struct CredentialEntry {
    pub provider_key: String,
    pub api_key: SecretString,
    /// Custom endpoint; `None` means the dialect's public default
    pub endpoint: Option<String>,
    pub dialect: ApiDialect,
}

impl CredentialEntry {
    pub fn new(provider_key: impl Into<String>, api_key: &str, dialect: ApiDialect) -> Self {
        Self {
            provider_key: provider_key.into(),
            api_key: SecretString::new(api_key.trim().to_string()),
            endpoint: None,
            dialect,
        }
    }

    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = endpoint
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        self
    }

    /// The endpoint to query, falling back to the dialect default.
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.dialect.default_endpoint())
    }
}

/// Parsed auxiliary files of one tool, keyed by role. Absent files are simply missing.
#[derive(Debug, Clone, Default)]
pub struct AuxiliaryTrees {
    trees: HashMap<AuxiliaryRole, ConfigTree>,
}

impl AuxiliaryTrees {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, role: AuxiliaryRole, tree: ConfigTree) {
        self.trees.insert(role, tree);
    }

    pub fn get(&self, role: AuxiliaryRole) -> Option<&ConfigTree> {
        self.trees.get(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

/// Outcome of choosing a credential.
#[derive(Debug)]
pub enum Resolution {
    Resolved(CredentialEntry),
    /// Several entries exist and nothing in the configuration picks one
    SelectionRequired(Vec<String>),
    NotFound,
}

/// Picks the credential a model-list request should use.
///
/// An explicit `selection` wins, then the provider recorded in the configuration, then a
/// lone entry. An explicit selection with no stored key resolves to [`Resolution::NotFound`]
/// rather than silently using another provider's key.
pub fn resolve(
    tool: ToolId,
    config: &ConfigTree,
    auxiliary: &AuxiliaryTrees,
    selection: Option<&str>,
) -> Resolution {
    let schema = schema::tool_schema(tool);
    let mut entries = (schema.credentials)(config, auxiliary);
    if entries.is_empty() {
        log::debug!("{tool}: no stored credentials");
        return Resolution::NotFound;
    }

    if let Some(wanted) = selection.map(str::trim).filter(|s| !s.is_empty()) {
        return match take_entry(&mut entries, wanted) {
            Some(entry) => Resolution::Resolved(entry),
            None => {
                log::debug!("{tool}: selected provider `{wanted}` has no stored key");
                Resolution::NotFound
            }
        };
    }

    if let Some(active) = schema.provider_selector.and_then(|s| s.read(config)) {
        if let Some(entry) = take_entry(&mut entries, &active) {
            return Resolution::Resolved(entry);
        }
        log::debug!("{tool}: active provider `{active}` has no stored key");
    }

    if entries.len() == 1 {
        return Resolution::Resolved(entries.remove(0));
    }
    Resolution::SelectionRequired(entries.into_iter().map(|e| e.provider_key).collect())
}

fn take_entry(entries: &mut Vec<CredentialEntry>, provider: &str) -> Option<CredentialEntry> {
    let index = entries.iter().position(|e| e.provider_key == provider)?;
    Some(entries.remove(index))
}
