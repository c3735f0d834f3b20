//! Mapping between a tool's on-disk tree and the editor's flat [`FormState`].
//!
//! Plain fields map 1:1 onto a dotted path. Virtual fields (keys starting with `_v_`) have no
//! direct location and are resolved by the tool's [`ProjectionStrategy`].

mod claude;
mod codex;
mod qoder;

use indexmap::{IndexMap, IndexSet};

use crate::merge;
use crate::path;
use crate::schema::{ToolSchema, VIRTUAL_PREFIX};
use crate::tree::{ConfigTree, ConfigValue};

pub use claude::ClaudeModelMirror;
pub use codex::CodexProviderSections;
pub use qoder::QoderKeyList;

/// Values bound to the editor widgets for one tool, plus which of them the user changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    values: IndexMap<String, ConfigValue>,
    edited: IndexSet<String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    /// Stores a value read from disk. Loaded values are not edits.
    pub fn load(&mut self, key: impl Into<String>, value: ConfigValue) {
        self.values.insert(key.into(), value);
    }

    /// Stores a value submitted by the user and marks it edited.
    pub fn edit(&mut self, key: impl Into<String>, value: ConfigValue) {
        let key = key.into();
        self.values.insert(key.clone(), value);
        self.edited.insert(key);
    }

    pub fn is_edited(&self, key: &str) -> bool {
        self.edited.contains(key)
    }

    pub fn has_edits(&self) -> bool {
        !self.edited.is_empty()
    }

    pub fn edited_keys(&self) -> impl Iterator<Item = &str> {
        self.edited.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.edited.clear();
    }
}

/// The result of mapping form edits back onto the real tree.
///
/// Applied in order: `removals`, then the deep-merged `patch`, then `replacements`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReverseProjection {
    pub patch: ConfigTree,
    /// Dotted paths deleted from the base before merging
    pub removals: Vec<String>,
    /// Values written wholesale after merging, bypassing the recursive merge
    pub replacements: Vec<(String, ConfigValue)>,
}

impl ReverseProjection {
    pub fn from_patch(patch: ConfigTree) -> Self {
        Self {
            patch,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patch.is_empty() && self.removals.is_empty() && self.replacements.is_empty()
    }

    /// Produces the tree to persist. `base` is left untouched.
    ///
    /// Virtual keys are stripped from the result at every depth, including any the base
    /// already carried.
    pub fn apply_to(&self, base: &ConfigTree) -> ConfigTree {
        let mut tree = base.clone();
        for removal in &self.removals {
            path::remove(&mut tree, removal);
        }
        merge::merge_into(&mut tree, &self.patch);
        for (target, value) in &self.replacements {
            path::set(&mut tree, target, value.clone());
        }
        without_virtual_keys(&tree)
    }
}

/// Per-tool mapping between the real tree and the editor form.
pub trait ProjectionStrategy: Send + Sync {
    fn project_to_form(&self, schema: &ToolSchema, tree: &ConfigTree) -> FormState {
        project_direct(schema, tree)
    }

    fn project_from_form(
        &self,
        schema: &ToolSchema,
        form: &FormState,
        _base: &ConfigTree,
    ) -> ReverseProjection {
        ReverseProjection::from_patch(patch_direct(schema, form))
    }
}

/// Identity projection: only plain schema fields, no virtual fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectProjection;

impl ProjectionStrategy for DirectProjection {}

/// Copies every plain schema field present in `tree` into a new form.
///
/// Absent fields stay absent; schema defaults are for display only.
pub fn project_direct(schema: &ToolSchema, tree: &ConfigTree) -> FormState {
    let mut form = FormState::new();
    for field in schema.fields.iter().filter(|field| !field.is_virtual) {
        if let Some(value) = path::get(tree, field.key) {
            form.load(field.key, value.clone());
        }
    }
    form
}

/// Builds a patch from the edited plain fields of `form`.
///
/// Keys with no schema field, and values whose kind the field does not accept, are logged
/// and dropped. Virtual keys are left to the tool's strategy.
pub fn patch_direct(schema: &ToolSchema, form: &FormState) -> ConfigTree {
    let mut patch = ConfigTree::new();
    for key in form.edited_keys() {
        let Some(value) = form.get(key) else {
            continue;
        };
        match schema.field(key) {
            None => log::warn!(
                "{}: dropping form key `{key}` with no matching schema field",
                schema.id()
            ),
            Some(field) if field.is_virtual => {}
            Some(field) if !field.kind.accepts(value) => log::warn!(
                "{}: dropping `{key}`, expected {:?} but got {}",
                schema.id(),
                field.kind,
                value.kind_name()
            ),
            Some(field) => path::set(&mut patch, field.key, value.clone()),
        }
    }
    patch
}

fn without_virtual_keys(tree: &ConfigTree) -> ConfigTree {
    tree.iter()
        .filter(|(key, _)| !key.starts_with(VIRTUAL_PREFIX))
        .map(|(key, value)| (key.clone(), strip_virtual(value)))
        .collect()
}

fn strip_virtual(value: &ConfigValue) -> ConfigValue {
    match value {
        ConfigValue::Table(nested) => ConfigValue::Table(without_virtual_keys(nested)),
        ConfigValue::Array(items) => ConfigValue::Array(items.iter().map(strip_virtual).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{parse, ConfigFormat};
    use crate::schema::{tool_schema, ToolId};

    fn json(text: &str) -> ConfigTree {
        parse(text, ConfigFormat::Json).unwrap()
    }

    #[test]
    fn direct_projection_loads_present_fields_only() {
        let schema = tool_schema(ToolId::Copilot);
        let tree = json(r#"{"editor": "vim", "github": {"token": "t"}, "other": 1}"#);
        let form = schema.projection.project_to_form(schema, &tree);
        assert_eq!(form.get_str("editor"), Some("vim"));
        assert_eq!(form.get_str("github.token"), Some("t"));
        assert_eq!(form.get("debug"), None);
        assert_eq!(form.get("other"), None);
        assert!(!form.has_edits());
    }

    #[test]
    fn unedited_form_produces_an_empty_patch() {
        let schema = tool_schema(ToolId::Copilot);
        let tree = json(r#"{"editor": "vim", "debug": true}"#);
        let form = schema.projection.project_to_form(schema, &tree);
        let reverse = schema.projection.project_from_form(schema, &form, &tree);
        assert!(reverse.is_empty());
        assert_eq!(reverse.apply_to(&tree), tree);
    }

    #[test]
    fn unknown_and_mistyped_keys_are_dropped() {
        let schema = tool_schema(ToolId::Copilot);
        let mut form = FormState::new();
        form.edit("editor", "nano".into());
        form.edit("__internal_widget_state", true.into());
        form.edit("debug", "yes".into());
        let patch = patch_direct(schema, &form);
        assert_eq!(patch, json(r#"{"editor": "nano"}"#));
    }

    #[test]
    fn virtual_keys_never_reach_the_tree() {
        let mut patch = ConfigTree::new();
        path::set(&mut patch, "model", "m".into());
        path::set(&mut patch, "_v_provider.base_url", "u".into());
        path::set(&mut patch, "nested._v_hidden", "h".into());
        let reverse = ReverseProjection {
            patch,
            removals: Vec::new(),
            replacements: vec![("_v_other".to_string(), "x".into())],
        };
        let applied = reverse.apply_to(&ConfigTree::new());
        assert_eq!(applied, json(r#"{"model": "m", "nested": {}}"#));
    }

    #[test]
    fn virtual_keys_already_in_the_base_are_stripped() {
        let base = json(
            r#"{"_v_provider": {"name": "stale"}, "env": {"_v_mirror": 1, "A": "b"}, "keep": 1}"#,
        );
        let reverse = ReverseProjection::from_patch(json(r#"{"keep": 2}"#));
        assert_eq!(
            reverse.apply_to(&base),
            json(r#"{"env": {"A": "b"}, "keep": 2}"#)
        );
    }

    #[test]
    fn removals_run_before_merge_and_replacements_after() {
        let base = json(r#"{"a": {"x": 1, "y": 2}, "b": {"keep": true, "old": 1}}"#);
        let reverse = ReverseProjection {
            patch: json(r#"{"a": {"z": 3}}"#),
            removals: vec!["a.x".to_string()],
            replacements: vec![("b".to_string(), ConfigValue::Table(json(r#"{"new": 1}"#)))],
        };
        let keys: Vec<_> = reverse.apply_to(&base).keys().cloned().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(
            reverse.apply_to(&base),
            json(r#"{"a": {"y": 2, "z": 3}, "b": {"new": 1}}"#)
        );
    }
}
