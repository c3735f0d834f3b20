//! Per-tool load, edit, save and model-discovery workflow.
//!
//! Every tool has its own session guarded by an async mutex that is held for the whole of a
//! load or save, so a reload issued while a save is writing sees the saved file.

mod state;


use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex as AsyncMutex;

use crate::credentials::{self, AuxiliaryTrees, Resolution};
use crate::discovery::{ApiDialect, FetchSequencer, HttpModelDiscovery, ModelDiscovery};
use crate::error::{DiscoveryError, SessionError};
use crate::format;
use crate::mcp::McpServer;
use crate::schema::{self, AuxiliaryRole, ToolId, ToolSchema};
use crate::settings::EngineSettings;
use crate::store::{ConfigStore, FsConfigStore};
use crate::tree::{ConfigTree, ConfigValue};

pub use state::{FaultStage, SessionFault, SessionSnapshot, SessionState};

use state::{PendingSave, ToolSession};

/// Outcome of a model-list request.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelFetch {
    Models {
        provider: String,
        dialect: ApiDialect,
        models: Vec<String>,
    },
    /// Several stored credentials and none selected; the caller should ask the user
    SelectionRequired(Vec<String>),
    MissingCredentials,
    /// A newer request for the same tool was issued while this one was in flight
    Stale,
}

pub struct SyncOrchestrator {
    store: Arc<dyn ConfigStore>,
    discovery: Arc<dyn ModelDiscovery>,
    sessions: Mutex<HashMap<ToolId, Arc<AsyncMutex<ToolSession>>>>,
    fetches: FetchSequencer,
}

impl SyncOrchestrator {
    pub fn new(store: Arc<dyn ConfigStore>, discovery: Arc<dyn ModelDiscovery>) -> Self {
        Self {
            store,
            discovery,
            sessions: Mutex::new(HashMap::new()),
            fetches: FetchSequencer::new(),
        }
    }

    /// Filesystem store and HTTP discovery configured from the engine settings.
    pub fn from_settings(settings: &EngineSettings) -> Result<Self, DiscoveryError> {
        let store = FsConfigStore::from_settings(&settings.paths);
        let discovery = HttpModelDiscovery::new(&settings.network)?;
        Ok(Self::new(Arc::new(store), Arc::new(discovery)))
    }

    fn session(&self, tool: ToolId) -> Arc<AsyncMutex<ToolSession>> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions
            .entry(tool)
            .or_insert_with(|| Arc::new(AsyncMutex::new(ToolSession::new(tool))))
            .clone()
    }

    /// Reads and parses the tool's file, replacing the session's base and form.
    ///
    /// A missing file loads as an empty tree. Read and parse failures put the session in the
    /// load-error state with an empty base.
    pub async fn load(&self, tool: ToolId) -> Result<SessionSnapshot, SessionError> {
        let handle = self.session(tool);
        let mut session = handle.lock().await;
        self.load_locked(tool, &mut session).await?;
        Ok(session.snapshot())
    }

    async fn load_locked(
        &self,
        tool: ToolId,
        session: &mut ToolSession,
    ) -> Result<(), SessionError> {
        session.begin_load();

        let descriptor = schema::descriptor(tool);
        log::info!("loading {tool} configuration from {}", descriptor.primary_path);

        let text = match self.store.read(descriptor.primary_path).await {
            Ok(text) => text,
            Err(err) => {
                log::warn!("{tool}: {err}");
                session.fail_load(err.to_string());
                return Err(err.into());
            }
        };

        let tree = match text {
            None => {
                log::debug!("{tool}: {} does not exist yet", descriptor.primary_path);
                ConfigTree::new()
            }
            Some(text) => match format::parse(&text, descriptor.format) {
                Ok(tree) => tree,
                Err(err) => {
                    log::warn!("{tool}: {err}");
                    session.fail_load(err.to_string());
                    return Err(err.into());
                }
            },
        };

        session.finish_load(tree);
        Ok(())
    }

    /// Records a form edit. Keys unknown to the schema are kept in the form but never saved.
    pub async fn edit(
        &self,
        tool: ToolId,
        key: &str,
        value: ConfigValue,
    ) -> Result<SessionState, SessionError> {
        let handle = self.session(tool);
        let mut session = handle.lock().await;
        session.record_edit(key, value)?;
        Ok(session.state().clone())
    }

    /// Merges the pending edits into the base and writes the result.
    ///
    /// On failure the session keeps its base and edits and can be saved again.
    /// If the returned future is dropped mid-write the session is left in the save-error
    /// state, so the save can be retried.
    pub async fn save(&self, tool: ToolId) -> Result<SessionSnapshot, SessionError> {
        let handle = self.session(tool);
        let mut session = handle.lock().await;
        self.save_locked(tool, &mut session).await
    }

    async fn save_locked(
        &self,
        tool: ToolId,
        session: &mut ToolSession,
    ) -> Result<SessionSnapshot, SessionError> {
        let (pending, merged) = PendingSave::begin(session)?;
        let descriptor = schema::descriptor(tool);

        let text = match format::serialize(&merged, descriptor.format) {
            Ok(text) => text,
            Err(err) => {
                log::warn!("{tool}: {err}");
                pending.fail(err.to_string());
                return Err(err.into());
            }
        };

        if let Err(err) = self.store.write(descriptor.primary_path, &text).await {
            log::warn!("{tool}: {err}");
            pending.fail(err.to_string());
            return Err(err.into());
        }

        let snapshot = pending.finish(merged);
        log::info!("saved {tool} configuration to {}", descriptor.primary_path);
        Ok(snapshot)
    }

    /// Writes `model` to the tool's model field and saves, loading first if needed.
    ///
    /// Goes through the tool's projection, so Claude's `env.ANTHROPIC_MODEL` override follows
    /// the change. Other pending edits are saved with it.
    pub async fn switch_model(
        &self,
        tool: ToolId,
        model: &str,
    ) -> Result<SessionSnapshot, SessionError> {
        let Some(field) = schema::tool_schema(tool).model_field else {
            return Err(SessionError::Unsupported {
                tool: tool.to_string(),
                action: "model switching",
            });
        };
        let handle = self.session(tool);
        let mut session = handle.lock().await;
        if !session.has_base() {
            self.load_locked(tool, &mut session).await?;
        }
        session.record_edit(field, model.trim().into())?;
        log::info!("{tool}: switching model to `{}`", model.trim());
        self.save_locked(tool, &mut session).await
    }

    /// Stores an API key in the tool's auth file, keeping every other entry. An empty key
    /// removes the provider's key.
    ///
    /// Holds the tool's session lock so it never interleaves with a load or save.
    pub async fn store_credential(
        &self,
        tool: ToolId,
        provider: &str,
        key: &SecretString,
    ) -> Result<(), SessionError> {
        let schema = schema::tool_schema(tool);
        let auth_file = schema.descriptor.auxiliary_file(AuxiliaryRole::Auth);
        let (Some(writer), Some(file)) = (schema.credential_writer, auth_file) else {
            return Err(SessionError::Unsupported {
                tool: tool.to_string(),
                action: "storing credentials",
            });
        };

        let handle = self.session(tool);
        let _session = handle.lock().await;
        let mut auth = match self.store.read(file.path).await? {
            Some(text) => format::parse(&text, file.format)?,
            None => ConfigTree::new(),
        };
        writer(&mut auth, provider, key.expose_secret())?;
        let text = format::serialize(&auth, file.format)?;
        self.store.write(file.path, &text).await?;
        log::info!("{tool}: updated credentials for `{}` in {}", provider.trim(), file.path);
        Ok(())
    }

    /// MCP servers configured across every tool, in registry order.
    ///
    /// Loaded sessions contribute their pending edits. Tools whose file cannot be read or
    /// parsed are logged and skipped.
    pub async fn list_mcp_servers(&self) -> Vec<McpServer> {
        let mut servers = Vec::new();
        for tool in ToolId::ALL {
            match self.effective_tree(tool).await {
                Ok(tree) => servers.extend(schema::tool_schema(tool).mcp.servers(tool, &tree)),
                Err(err) => log::warn!("{tool}: skipping MCP servers: {err}"),
            }
        }
        servers
    }

    pub async fn snapshot(&self, tool: ToolId) -> SessionSnapshot {
        let handle = self.session(tool);
        let session = handle.lock().await;
        session.snapshot()
    }

    /// The document a save would write right now, for the raw-text editor.
    pub async fn raw_text(&self, tool: ToolId) -> Result<String, SessionError> {
        let handle = self.session(tool);
        let session = handle.lock().await;
        Ok(format::serialize(
            &session.pending_tree(),
            schema::descriptor(tool).format,
        )?)
    }

    /// Replaces the session's content with text typed into the raw editor.
    ///
    /// Malformed text moves the session into the load-error state.
    pub async fn apply_raw_text(
        &self,
        tool: ToolId,
        text: &str,
    ) -> Result<SessionSnapshot, SessionError> {
        let handle = self.session(tool);
        let mut session = handle.lock().await;
        match format::parse(text, schema::descriptor(tool).format) {
            Ok(tree) => {
                session.replace_base(tree)?;
                Ok(session.snapshot())
            }
            Err(err) => {
                session.fail_load(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Leaves the load-error state with an empty base, accepting that the next save
    /// overwrites the unreadable file.
    pub async fn start_fresh(&self, tool: ToolId) -> Result<SessionSnapshot, SessionError> {
        let handle = self.session(tool);
        let mut session = handle.lock().await;
        session.start_fresh()?;
        log::info!("{tool}: starting from an empty configuration");
        Ok(session.snapshot())
    }

    /// Drops the tool's session; pending edits are discarded.
    pub async fn close(&self, tool: ToolId) {
        let handle = {
            let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
            sessions.remove(&tool)
        };
        if let Some(handle) = handle {
            // wait for an in-flight load or save to finish
            let _ = handle.lock().await;
        }
    }

    /// Lists the models available to the tool's configured (or `selection`'s) credentials.
    ///
    /// Pending edits count: credentials typed into the form but not yet saved are used.
    pub async fn fetch_models(
        &self,
        tool: ToolId,
        selection: Option<&str>,
    ) -> Result<ModelFetch, SessionError> {
        let ticket = self.fetches.begin(tool);
        let schema = schema::tool_schema(tool);
        let config = self.effective_tree(tool).await?;
        let auxiliary = self.read_auxiliary(schema).await;

        let entry = match credentials::resolve(tool, &config, &auxiliary, selection) {
            Resolution::Resolved(entry) => entry,
            Resolution::SelectionRequired(candidates) => {
                return Ok(ModelFetch::SelectionRequired(candidates));
            }
            Resolution::NotFound => return Ok(ModelFetch::MissingCredentials),
        };

        log::debug!("{tool}: listing models for provider `{}`", entry.provider_key);
        let result = self
            .discovery
            .fetch_models(entry.endpoint(), &entry.api_key, entry.dialect)
            .await;

        if !self.fetches.is_current(&ticket) {
            log::debug!("{tool}: discarding superseded model list response");
            return Ok(ModelFetch::Stale);
        }

        Ok(ModelFetch::Models {
            provider: entry.provider_key,
            dialect: entry.dialect,
            models: result?,
        })
    }

    async fn effective_tree(&self, tool: ToolId) -> Result<ConfigTree, SessionError> {
        {
            let handle = self.session(tool);
            let session = handle.lock().await;
            if session.has_base() {
                return Ok(session.pending_tree());
            }
        }
        let descriptor = schema::descriptor(tool);
        match self.store.read(descriptor.primary_path).await? {
            Some(text) => Ok(format::parse(&text, descriptor.format)?),
            None => Ok(ConfigTree::new()),
        }
    }

    /// Unreadable or malformed auxiliary files count as absent.
    async fn read_auxiliary(&self, schema: &ToolSchema) -> AuxiliaryTrees {
        let mut trees = AuxiliaryTrees::new();
        for file in schema.descriptor.auxiliary {
            match self.store.read(file.path).await {
                Ok(Some(text)) => match format::parse(&text, file.format) {
                    Ok(tree) => trees.insert(file.role, tree),
                    Err(err) => log::warn!("{}: ignoring {}: {err}", schema.id(), file.path),
                },
                Ok(None) => {}
                Err(err) => log::warn!("{}: ignoring {}: {err}", schema.id(), file.path),
            }
        }
        trees
    }
}
