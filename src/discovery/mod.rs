//! Listing the models a provider endpoint offers.
//!
//! Endpoints speak one of three dialects that differ in authentication headers and in the
//! shape of the list response. [`FetchSequencer`] lets callers discard responses that were
//! overtaken by a newer request for the same tool.

pub mod http;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;
use crate::schema::ToolId;

pub use http::HttpModelDiscovery;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Wire conventions of a model-listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiDialect {
    #[default]
    OpenAI,
    Anthropic,
    Google,
}

impl ApiDialect {
    /// Maps a provider name to its dialect; anything unrecognized is OpenAI-compatible.
    pub fn for_provider(provider: &str) -> Self {
        match provider.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => ApiDialect::Anthropic,
            "google" | "gemini" => ApiDialect::Google,
            _ => ApiDialect::OpenAI,
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ApiDialect::OpenAI => "https://api.openai.com/v1",
            ApiDialect::Anthropic => "https://api.anthropic.com/v1",
            ApiDialect::Google => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    pub fn models_url(&self, endpoint: &str) -> String {
        format!("{}/models", endpoint.trim().trim_end_matches('/'))
    }

    pub fn auth_headers(&self, api_key: &str) -> Vec<(&'static str, String)> {
        match self {
            ApiDialect::OpenAI => vec![("Authorization", format!("Bearer {api_key}"))],
            ApiDialect::Anthropic => vec![
                ("x-api-key", api_key.to_string()),
                ("anthropic-version", ANTHROPIC_VERSION.to_string()),
            ],
            ApiDialect::Google => vec![("x-goog-api-key", api_key.to_string())],
        }
    }
}

impl fmt::Display for ApiDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApiDialect::OpenAI => "openai",
            ApiDialect::Anthropic => "anthropic",
            ApiDialect::Google => "google",
        };
        f.write_str(name)
    }
}

impl FromStr for ApiDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ApiDialect::OpenAI),
            "anthropic" => Ok(ApiDialect::Anthropic),
            "google" => Ok(ApiDialect::Google),
            other => Err(format!("unknown api dialect: {other}")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Option<Vec<ModelEntry>>,
    models: Option<Vec<ModelEntry>>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: Option<String>,
    name: Option<String>,
}

/// Extracts model identifiers from a list response.
///
/// Accepts OpenAI/Anthropic style `data[].id` and Google style `models[].name`, dropping the
/// `models/` prefix Google puts on every name.
pub fn parse_model_list(body: &str) -> Result<Vec<String>, DiscoveryError> {
    let response: ModelsResponse = serde_json::from_str(body)
        .map_err(|err| DiscoveryError::transport(format!("invalid model list response: {err}")))?;
    let ids = response
        .data
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.id)
        .chain(response.models.into_iter().flatten().filter_map(|entry| {
            entry
                .name
                .map(|name| name.strip_prefix("models/").unwrap_or(&name).to_string())
        }))
        .filter(|id| !id.trim().is_empty())
        .collect();
    Ok(ids)
}

/// Remote model listing.
#[async_trait]
pub trait ModelDiscovery: Send + Sync {
    async fn fetch_models(
        &self,
        endpoint: &str,
        api_key: &SecretString,
        dialect: ApiDialect,
    ) -> Result<Vec<String>, DiscoveryError>;
}

/// Identifies one model-list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub tool: ToolId,
    sequence: u64,
}

/// Per-tool request counter. Only the most recently issued ticket of a tool is current.
#[derive(Debug)]
pub struct FetchSequencer {
    latest: [AtomicU64; ToolId::ALL.len()],
}

impl Default for FetchSequencer {
    fn default() -> Self {
        Self {
            latest: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket, superseding every earlier one for `tool`.
    pub fn begin(&self, tool: ToolId) -> FetchTicket {
        let sequence = self.latest[tool.index()].fetch_add(1, Ordering::SeqCst) + 1;
        FetchTicket { tool, sequence }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.latest[ticket.tool.index()].load(Ordering::SeqCst) == ticket.sequence
    }
}
