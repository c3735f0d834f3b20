use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::format::ConfigFormat;

/// Errors raised while parsing or serializing a configuration document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// The document is not well-formed; `message` is the parser's own text
    #[error("failed to parse {format}: {message}")]
    Parse {
        format: ConfigFormat,
        message: String,
    },
    /// The document parsed but its root is not a table
    #[error("{format} document root must be a table, found {found}")]
    RootNotTable {
        format: ConfigFormat,
        found: &'static str,
    },
    /// A value in the tree has no representation in the target format
    #[error("{format} cannot represent the value at `{path}`: {reason}")]
    Unrepresentable {
        format: ConfigFormat,
        path: String,
        reason: String,
    },
    /// The serializer itself rejected the tree
    #[error("failed to serialize {format}: {message}")]
    Serialize {
        format: ConfigFormat,
        message: String,
    },
}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        FormatError::Parse {
            format: ConfigFormat::Json,
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FormatError {
    fn from(err: toml::de::Error) -> Self {
        FormatError::Parse {
            format: ConfigFormat::Toml,
            message: err.to_string().trim_end().to_string(),
        }
    }
}

impl From<toml::ser::Error> for FormatError {
    fn from(err: toml::ser::Error) -> Self {
        FormatError::Serialize {
            format: ConfigFormat::Toml,
            message: err.to_string(),
        }
    }
}

/// Errors raised by a persistence collaborator.
///
/// A missing file is never a `StoreError`; stores report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("missing home directory for `~` expansion")]
    MissingHome,
}

/// A failed model-list request.
///
/// `status` is the HTTP status when the server answered, `None` when the request never got a
/// response (DNS, TLS, timeouts, malformed bodies).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe_discovery(*status, message))]
pub struct DiscoveryError {
    pub status: Option<u16>,
    pub message: String,
}

impl DiscoveryError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

fn describe_discovery(status: Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("model discovery failed with HTTP {code}: {message}"),
        None => format!("model discovery failed: {message}"),
    }
}

impl From<reqwest::Error> for DiscoveryError {
    fn from(err: reqwest::Error) -> Self {
        DiscoveryError {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Errors for the engine's own settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings IO error: {0}")]
    Io(#[from] io::Error),
    #[error("settings parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("settings serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("missing home directory for settings paths")]
    MissingHome,
    #[error("invalid proxy configuration: {0}")]
    InvalidProxy(String),
}

/// Rejected updates to a tool's auth file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialWriteError {
    #[error("a provider name is required")]
    MissingProvider,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tool: {0}")]
pub struct UnknownToolError(pub String);

/// Errors returned by the synchronization orchestrator.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    UnknownTool(#[from] UnknownToolError),
    #[error(transparent)]
    Credential(#[from] CredentialWriteError),
    /// The tool has nowhere to put what the operation writes
    #[error("{tool} does not support {action}")]
    Unsupported { tool: String, action: &'static str },
    /// The requested transition is not allowed from the session's current state
    #[error("cannot {action} while the {tool} session is {state}")]
    InvalidState {
        tool: String,
        action: &'static str,
        state: String,
    },
}
