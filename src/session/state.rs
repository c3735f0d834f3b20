use std::fmt;

use crate::error::SessionError;
use crate::projection::FormState;
use crate::schema::{self, ToolId, ToolSchema};
use crate::tree::{ConfigTree, ConfigValue};

/// Which operation left a session in the error state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultStage {
    Load,
    Save,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFault {
    pub stage: FaultStage,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Loading,
    Ready,
    Editing,
    Saving,
    Error(SessionFault),
}

impl SessionState {
    fn error(stage: FaultStage, message: impl Into<String>) -> Self {
        SessionState::Error(SessionFault {
            stage,
            message: message.into(),
        })
    }

    fn is_load_error(&self) -> bool {
        matches!(self, SessionState::Error(SessionFault { stage: FaultStage::Load, .. }))
    }

    fn is_save_error(&self) -> bool {
        matches!(self, SessionState::Error(SessionFault { stage: FaultStage::Save, .. }))
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => f.write_str("idle"),
            SessionState::Loading => f.write_str("loading"),
            SessionState::Ready => f.write_str("ready"),
            SessionState::Editing => f.write_str("editing"),
            SessionState::Saving => f.write_str("saving"),
            SessionState::Error(fault) => match fault.stage {
                FaultStage::Load => write!(f, "failed to load ({})", fault.message),
                FaultStage::Save => write!(f, "failed to save ({})", fault.message),
            },
        }
    }
}

/// Point-in-time copy of a session for display.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub tool: ToolId,
    pub state: SessionState,
    pub form: FormState,
    pub base: ConfigTree,
}

impl SessionSnapshot {
    /// The form value, or the schema default when the field is absent from the file.
    pub fn display_value(&self, key: &str) -> Option<ConfigValue> {
        self.form.get(key).cloned().or_else(|| {
            schema::tool_schema(self.tool)
                .field(key)
                .and_then(|field| field.default.clone())
        })
    }

    pub fn has_unsaved_edits(&self) -> bool {
        self.form.has_edits()
    }
}

/// Mutable state of one tool's editing session. Always accessed under the session's lock.
#[derive(Debug)]
pub(crate) struct ToolSession {
    tool: ToolId,
    state: SessionState,
    base: ConfigTree,
    form: FormState,
}

impl ToolSession {
    pub(crate) fn new(tool: ToolId) -> Self {
        Self {
            tool,
            state: SessionState::Idle,
            base: ConfigTree::new(),
            form: FormState::new(),
        }
    }

    fn schema(&self) -> &'static ToolSchema {
        schema::tool_schema(self.tool)
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidState {
            tool: self.tool.to_string(),
            action,
            state: self.state.to_string(),
        }
    }

    pub(crate) fn state(&self) -> &SessionState {
        &self.state
    }

    /// True once `base` reflects a real load (or an explicit fresh start).
    pub(crate) fn has_base(&self) -> bool {
        match &self.state {
            SessionState::Ready | SessionState::Editing | SessionState::Saving => true,
            state => state.is_save_error(),
        }
    }

    pub(crate) fn begin_load(&mut self) {
        self.form.clear();
        self.state = SessionState::Loading;
    }

    pub(crate) fn finish_load(&mut self, tree: ConfigTree) {
        self.form = self.schema().projection.project_to_form(self.schema(), &tree);
        self.base = tree;
        self.state = SessionState::Ready;
    }

    /// Leaves no base behind. Saving stays refused until a reload or a fresh start.
    pub(crate) fn fail_load(&mut self, message: impl Into<String>) {
        self.base = ConfigTree::new();
        self.form.clear();
        self.state = SessionState::error(FaultStage::Load, message);
    }

    pub(crate) fn start_fresh(&mut self) -> Result<(), SessionError> {
        if !self.state.is_load_error() {
            return Err(self.invalid("start fresh"));
        }
        self.base = ConfigTree::new();
        self.form.clear();
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Replaces the base with a tree the user typed directly. The next save writes it.
    pub(crate) fn replace_base(&mut self, tree: ConfigTree) -> Result<(), SessionError> {
        if matches!(
            self.state,
            SessionState::Idle | SessionState::Loading | SessionState::Saving
        ) {
            return Err(self.invalid("apply raw text"));
        }
        self.finish_load(tree);
        self.state = SessionState::Editing;
        Ok(())
    }

    pub(crate) fn record_edit(
        &mut self,
        key: &str,
        value: ConfigValue,
    ) -> Result<(), SessionError> {
        let editable = matches!(self.state, SessionState::Ready | SessionState::Editing)
            || self.state.is_save_error();
        if !editable {
            return Err(self.invalid("edit"));
        }
        if self.schema().field(key).is_none() {
            log::debug!("{}: accepted edit for unknown key `{key}`", self.tool);
        }
        self.form.edit(key, value);
        self.state = SessionState::Editing;
        Ok(())
    }

    /// Base plus pending edits, as it would be written.
    pub(crate) fn pending_tree(&self) -> ConfigTree {
        let schema = self.schema();
        schema
            .projection
            .project_from_form(schema, &self.form, &self.base)
            .apply_to(&self.base)
    }

    pub(crate) fn begin_save(&mut self) -> Result<ConfigTree, SessionError> {
        let savable = matches!(self.state, SessionState::Ready | SessionState::Editing)
            || self.state.is_save_error();
        if !savable {
            return Err(self.invalid("save"));
        }
        self.state = SessionState::Saving;
        Ok(self.pending_tree())
    }

    pub(crate) fn finish_save(&mut self, merged: ConfigTree) {
        self.finish_load(merged);
    }

    /// Edits and base survive so the user can retry.
    pub(crate) fn fail_save(&mut self, message: impl Into<String>) {
        self.state = SessionState::error(FaultStage::Save, message);
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            tool: self.tool,
            state: self.state.clone(),
            form: self.form.clone(),
            base: self.base.clone(),
        }
    }
}

/// A save in progress on a locked session.
///
/// Dropping it unsettled, for example when the saving future is cancelled mid-write, leaves
/// the session in the save-error state with its edits intact.
pub(crate) struct PendingSave<'a> {
    session: &'a mut ToolSession,
    settled: bool,
}

impl<'a> PendingSave<'a> {
    pub(crate) fn begin(session: &'a mut ToolSession) -> Result<(Self, ConfigTree), SessionError> {
        let merged = session.begin_save()?;
        Ok((
            Self {
                session,
                settled: false,
            },
            merged,
        ))
    }

    pub(crate) fn finish(mut self, merged: ConfigTree) -> SessionSnapshot {
        self.settled = true;
        self.session.finish_save(merged);
        self.session.snapshot()
    }

    pub(crate) fn fail(mut self, message: impl Into<String>) {
        self.settled = true;
        self.session.fail_save(message);
    }
}

impl Drop for PendingSave<'_> {
    fn drop(&mut self) {
        if !self.settled {
            log::warn!("{}: save interrupted before the write completed", self.session.tool);
            self.session.fail_save("save interrupted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_are_refused_before_load() {
        let mut session = ToolSession::new(ToolId::Gemini);
        assert!(matches!(
            session.record_edit("model", "x".into()),
            Err(SessionError::InvalidState { action: "edit", .. })
        ));
    }

    #[test]
    fn load_failure_clears_base_and_blocks_save() {
        let mut session = ToolSession::new(ToolId::Gemini);
        session.begin_load();
        let mut tree = ConfigTree::new();
        tree.insert("model".into(), "gemini-1.5-pro".into());
        session.finish_load(tree);
        session.begin_load();
        session.fail_load("boom");

        assert!(session.snapshot().base.is_empty());
        assert!(session.snapshot().form.is_empty());
        assert!(session.begin_save().is_err());

        session.start_fresh().unwrap();
        assert_eq!(session.state(), &SessionState::Ready);
        assert!(session.begin_save().unwrap().is_empty());
    }

    #[test]
    fn start_fresh_is_only_for_load_errors() {
        let mut session = ToolSession::new(ToolId::Gemini);
        session.finish_load(ConfigTree::new());
        assert!(session.start_fresh().is_err());
    }

    #[test]
    fn save_error_keeps_edits_and_allows_retry() {
        let mut session = ToolSession::new(ToolId::Gemini);
        session.finish_load(ConfigTree::new());
        session.record_edit("model", "gemini-2.5-pro".into()).unwrap();
        session.begin_save().unwrap();
        session.fail_save("disk full");

        let snapshot = session.snapshot();
        assert!(snapshot.has_unsaved_edits());
        assert_eq!(snapshot.form.get_str("model"), Some("gemini-2.5-pro"));
        assert_eq!(
            snapshot.state.to_string(),
            "failed to save (disk full)"
        );
        assert!(session.begin_save().is_ok());
    }

    #[test]
    fn dropped_save_becomes_a_save_error() {
        let mut session = ToolSession::new(ToolId::Gemini);
        session.finish_load(ConfigTree::new());
        session.record_edit("model", "gemini-2.5-pro".into()).unwrap();
        {
            let (_pending, merged) = PendingSave::begin(&mut session).unwrap();
            assert_eq!(merged.get("model"), Some(&ConfigValue::from("gemini-2.5-pro")));
        }

        assert_eq!(session.state().to_string(), "failed to save (save interrupted)");
        assert!(session.snapshot().has_unsaved_edits());
        let (pending, merged) = PendingSave::begin(&mut session).unwrap();
        let snapshot = pending.finish(merged);
        assert_eq!(snapshot.state, SessionState::Ready);
    }

    #[test]
    fn display_value_falls_back_to_schema_default() {
        let mut session = ToolSession::new(ToolId::Gemini);
        session.finish_load(ConfigTree::new());
        let snapshot = session.snapshot();
        assert_eq!(snapshot.display_value("temperature"), Some(ConfigValue::Float(0.9)));
        assert_eq!(snapshot.display_value("nonexistent"), None);
    }
}
