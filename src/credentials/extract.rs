//! Per-tool credential extractors referenced from the schema registry.

use crate::discovery::ApiDialect;
use crate::path;
use crate::schema::AuxiliaryRole;
use crate::tree::{ConfigTree, ConfigValue};

use super::{AuxiliaryTrees, CredentialEntry};

const ANTHROPIC_KEYS: [&str; 2] = ["env.ANTHROPIC_AUTH_TOKEN", "env.ANTHROPIC_API_KEY"];

fn non_empty<'a>(tree: &'a ConfigTree, key: &str) -> Option<&'a str> {
    path::get(tree, key).and_then(ConfigValue::as_non_empty_str)
}

/// Anthropic-compatible gateways are configured without the `/v1` suffix.
fn anthropic_endpoint(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.ends_with("/v1") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v1")
    }
}

pub fn claude(config: &ConfigTree, _auxiliary: &AuxiliaryTrees) -> Vec<CredentialEntry> {
    let Some(key) = ANTHROPIC_KEYS.iter().find_map(|k| non_empty(config, k)) else {
        return Vec::new();
    };
    let endpoint = non_empty(config, "env.ANTHROPIC_BASE_URL").map(anthropic_endpoint);
    vec![CredentialEntry::new("anthropic", key, ApiDialect::Anthropic).with_endpoint(endpoint)]
}

pub fn gemini(config: &ConfigTree, _auxiliary: &AuxiliaryTrees) -> Vec<CredentialEntry> {
    non_empty(config, "apiKey")
        .map(|key| CredentialEntry::new("google", key, ApiDialect::Google))
        .into_iter()
        .collect()
}

pub fn codebuddy(config: &ConfigTree, _auxiliary: &AuxiliaryTrees) -> Vec<CredentialEntry> {
    let Some(key) = non_empty(config, "env.CODEBUDDY_API_KEY") else {
        return Vec::new();
    };
    let endpoint = non_empty(config, "env.CODEBUDDY_BASE_URL").map(str::to_string);
    vec![CredentialEntry::new("codebuddy", key, ApiDialect::OpenAI).with_endpoint(endpoint)]
}

/// `api_keys.<name> = { key, endpoint }` in the settings file itself.
pub fn qoder(config: &ConfigTree, _auxiliary: &AuxiliaryTrees) -> Vec<CredentialEntry> {
    let Some(section) = config.get("api_keys").and_then(ConfigValue::as_table) else {
        return Vec::new();
    };
    section
        .iter()
        .filter_map(|(name, entry)| {
            let entry = entry.as_table()?;
            let key = non_empty(entry, "key")?;
            let endpoint = non_empty(entry, "endpoint").map(str::to_string);
            Some(
                CredentialEntry::new(name.as_str(), key, ApiDialect::for_provider(name))
                    .with_endpoint(endpoint),
            )
        })
        .collect()
}

/// Keys live in the auth file as `<provider> = { type, key, address? }`. A custom endpoint can
/// also come from `provider.<name>.options.baseURL` in the main config.
pub fn opencode(config: &ConfigTree, auxiliary: &AuxiliaryTrees) -> Vec<CredentialEntry> {
    let Some(auth) = auxiliary.get(AuxiliaryRole::Auth) else {
        return Vec::new();
    };
    auth.iter()
        .filter_map(|(name, entry)| {
            let entry = entry.as_table()?;
            let key = non_empty(entry, "key")?;
            let configured = path::join(["provider", name.as_str(), "options", "baseURL"]);
            let endpoint = non_empty(entry, "address")
                .or_else(|| non_empty(config, &configured))
                .map(str::to_string);
            Some(
                CredentialEntry::new(name.as_str(), key, ApiDialect::for_provider(name))
                    .with_endpoint(endpoint),
            )
        })
        .collect()
}

/// One key in the auth file; the endpoint comes from the active `model_providers` section.
pub fn codex(config: &ConfigTree, auxiliary: &AuxiliaryTrees) -> Vec<CredentialEntry> {
    let Some(key) = auxiliary
        .get(AuxiliaryRole::Auth)
        .and_then(|auth| non_empty(auth, "OPENAI_API_KEY"))
    else {
        return Vec::new();
    };
    let provider = non_empty(config, "model_provider").unwrap_or("openai");
    let section = path::join(["model_providers", provider, "base_url"]);
    let endpoint = non_empty(config, &section).map(str::to_string);
    vec![
        CredentialEntry::new(provider, key, ApiDialect::for_provider(provider))
            .with_endpoint(endpoint),
    ]
}

/// For tools whose credentials cannot be used for model listing.
pub fn none(_config: &ConfigTree, _auxiliary: &AuxiliaryTrees) -> Vec<CredentialEntry> {
    Vec::new()
}
