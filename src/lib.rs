//! Configuration synchronization for command-line AI agent tools.
//!
//! Each supported tool keeps its settings in its own JSON or TOML file. This crate loads those
//! files into a format-independent [`ConfigTree`], projects them onto a flat editor form
//! described by a static schema registry, merges edits back without disturbing keys the editor
//! does not manage, and lists the models available to the tool's configured credentials.
//!
//! The entry point is [`SyncOrchestrator`]:
//!
//! ```no_run
//! use std::sync::Arc;
//! use vizconf::{HttpModelDiscovery, FsConfigStore, SyncOrchestrator, ToolId};
//! use vizconf::settings::NetworkSettings;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let discovery = HttpModelDiscovery::new(&NetworkSettings::default())?;
//! let engine = SyncOrchestrator::new(Arc::new(FsConfigStore::new()), Arc::new(discovery));
//!
//! engine.load(ToolId::Gemini).await?;
//! engine.edit(ToolId::Gemini, "model", "gemini-1.5-flash".into()).await?;
//! engine.save(ToolId::Gemini).await?;
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod discovery;
pub mod error;
pub mod format;
#[cfg(feature = "logging")]
pub mod logging;
pub mod mcp;
pub mod merge;
pub mod path;
pub mod projection;
pub mod schema;
pub mod session;
pub mod settings;
pub mod store;
pub mod tree;

pub use discovery::{ApiDialect, HttpModelDiscovery, ModelDiscovery};
pub use error::{
    CredentialWriteError, DiscoveryError, FormatError, SessionError, SettingsError, StoreError,
};
pub use format::ConfigFormat;
pub use mcp::McpServer;
pub use projection::FormState;
pub use schema::{FieldKind, SchemaField, ToolId};
pub use session::{ModelFetch, SessionSnapshot, SessionState, SyncOrchestrator};
pub use store::{ConfigStore, FsConfigStore, MemoryConfigStore};
pub use tree::{ConfigTree, ConfigValue};
