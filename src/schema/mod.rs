//! Static registry of the managed tools: where their files live, which fields the editor can
//! show, and the per-tool projection and credential strategies.

mod tools;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::credentials::{CredentialExtractor, CredentialWriter};
use crate::error::UnknownToolError;
use crate::format::ConfigFormat;
use crate::mcp::McpLayout;
use crate::path;
use crate::projection::ProjectionStrategy;
use crate::tree::{ConfigTree, ConfigValue};

/// Command-line tools whose configuration can be managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolId {
    Claude,
    Gemini,
    OpenCode,
    Qoder,
    CodeBuddy,
    Copilot,
    Codex,
}

impl ToolId {
    pub const ALL: [ToolId; 7] = [
        ToolId::Claude,
        ToolId::Gemini,
        ToolId::OpenCode,
        ToolId::Qoder,
        ToolId::CodeBuddy,
        ToolId::Copilot,
        ToolId::Codex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolId::Claude => "claude",
            ToolId::Gemini => "gemini",
            ToolId::OpenCode => "opencode",
            ToolId::Qoder => "qoder",
            ToolId::CodeBuddy => "codebuddy",
            ToolId::Copilot => "copilot",
            ToolId::Codex => "codex",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolId {
    type Err = UnknownToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "claude" | "claude-code" => Ok(ToolId::Claude),
            "gemini" | "google" => Ok(ToolId::Gemini),
            "opencode" => Ok(ToolId::OpenCode),
            "qoder" => Ok(ToolId::Qoder),
            "codebuddy" => Ok(ToolId::CodeBuddy),
            "copilot" => Ok(ToolId::Copilot),
            "codex" => Ok(ToolId::Codex),
            _ => Err(UnknownToolError(s.to_string())),
        }
    }
}

/// Editor widget family for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
    Number,
    StringArray,
    /// Structured value (table or list of tables) edited as one unit
    Group,
}

impl FieldKind {
    pub fn accepts(&self, value: &ConfigValue) -> bool {
        match self {
            FieldKind::String => matches!(value, ConfigValue::String(_)),
            FieldKind::Boolean => matches!(value, ConfigValue::Bool(_)),
            FieldKind::Number => matches!(
                value,
                ConfigValue::Integer(_) | ConfigValue::UInt(_) | ConfigValue::Float(_)
            ),
            FieldKind::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| item.as_str().is_some())),
            FieldKind::Group => matches!(value, ConfigValue::Table(_) | ConfigValue::Array(_)),
        }
    }
}

/// One editable field.
///
/// `key` is a dotted path into the tool's tree, or for virtual fields an editor-only key
/// starting with [`VIRTUAL_PREFIX`].
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub key: &'static str,
    pub kind: FieldKind,
    pub label: &'static str,
    pub description: Option<&'static str>,
    pub options: &'static [&'static str],
    pub default: Option<ConfigValue>,
    pub is_virtual: bool,
    pub secret: bool,
}

/// Prefix shared by every editor-only key. Such keys are never persisted.
pub const VIRTUAL_PREFIX: &str = "_v_";

impl SchemaField {
    pub fn new(key: &'static str, kind: FieldKind, label: &'static str) -> Self {
        Self {
            key,
            kind,
            label,
            description: None,
            options: &[],
            default: None,
            is_virtual: key.starts_with(VIRTUAL_PREFIX),
            secret: false,
        }
    }

    pub fn string(key: &'static str, label: &'static str) -> Self {
        Self::new(key, FieldKind::String, label)
    }

    pub fn boolean(key: &'static str, label: &'static str) -> Self {
        Self::new(key, FieldKind::Boolean, label)
    }

    pub fn number(key: &'static str, label: &'static str) -> Self {
        Self::new(key, FieldKind::Number, label)
    }

    pub fn string_array(key: &'static str, label: &'static str) -> Self {
        Self::new(key, FieldKind::StringArray, label).with_default(Vec::<ConfigValue>::new())
    }

    pub fn group(key: &'static str, label: &'static str) -> Self {
        Self::new(key, FieldKind::Group, label)
    }

    pub fn with_default(mut self, value: impl Into<ConfigValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_options(mut self, options: &'static [&'static str]) -> Self {
        self.options = options;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }
}

/// Role of a file that accompanies the primary configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuxiliaryRole {
    /// Credentials kept apart from the settings file
    Auth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuxiliaryFile {
    pub role: AuxiliaryRole,
    pub path: &'static str,
    pub format: ConfigFormat,
}

/// Where a tool keeps its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfigDescriptor {
    pub id: ToolId,
    pub primary_path: &'static str,
    pub format: ConfigFormat,
    pub auxiliary: &'static [AuxiliaryFile],
}

impl ToolConfigDescriptor {
    pub fn auxiliary_file(&self, role: AuxiliaryRole) -> Option<&'static AuxiliaryFile> {
        self.auxiliary.iter().find(|file| file.role == role)
    }
}

/// How the active provider is recorded in a tool's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderSelector {
    /// The field holds the provider key directly
    Field(&'static str),
    /// The field holds `provider/model`; the provider is the part before the first `/`
    ModelPrefix(&'static str),
}

impl ProviderSelector {
    pub fn read(&self, tree: &ConfigTree) -> Option<String> {
        match self {
            ProviderSelector::Field(key) => path::get(tree, key)
                .and_then(ConfigValue::as_non_empty_str)
                .map(str::to_string),
            ProviderSelector::ModelPrefix(key) => path::get(tree, key)
                .and_then(ConfigValue::as_non_empty_str)
                .and_then(|model| model.split_once('/'))
                .map(|(provider, _)| provider.trim().to_string())
                .filter(|provider| !provider.is_empty()),
        }
    }
}

/// Everything the engine knows about one tool.
pub struct ToolSchema {
    pub descriptor: ToolConfigDescriptor,
    pub fields: Vec<SchemaField>,
    pub provider_selector: Option<ProviderSelector>,
    pub projection: Box<dyn ProjectionStrategy>,
    pub credentials: CredentialExtractor,
    /// Set for tools whose keys live in an auth file the engine can update
    pub credential_writer: Option<CredentialWriter>,
    /// Form key that holds the active model
    pub model_field: Option<&'static str>,
    pub mcp: McpLayout,
}

impl ToolSchema {
    pub fn id(&self) -> ToolId {
        self.descriptor.id
    }

    pub fn field(&self, key: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|field| field.key == key)
    }
}

impl fmt::Debug for ToolSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSchema")
            .field("descriptor", &self.descriptor)
            .field("fields", &self.fields.len())
            .field("provider_selector", &self.provider_selector)
            .field("model_field", &self.model_field)
            .field("mcp", &self.mcp)
            .finish_non_exhaustive()
    }
}

fn registry() -> &'static [ToolSchema] {
    static REGISTRY: OnceLock<Vec<ToolSchema>> = OnceLock::new();
    REGISTRY.get_or_init(|| ToolId::ALL.iter().map(|id| tools::build(*id)).collect())
}

pub fn tool_schema(id: ToolId) -> &'static ToolSchema {
    &registry()[id.index()]
}

pub fn fields(id: ToolId) -> &'static [SchemaField] {
    &tool_schema(id).fields
}

pub fn descriptor(id: ToolId) -> &'static ToolConfigDescriptor {
    &tool_schema(id).descriptor
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case("claude", ToolId::Claude)]
    #[case("Google", ToolId::Gemini)]
    #[case(" gemini ", ToolId::Gemini)]
    #[case("OpenCode", ToolId::OpenCode)]
    #[case("codex", ToolId::Codex)]
    fn tool_ids_parse_case_insensitively(#[case] input: &str, #[case] expected: ToolId) {
        assert_eq!(input.parse::<ToolId>().unwrap(), expected);
    }

    #[test]
    fn unknown_tool_is_rejected() {
        assert_eq!(
            "cursor".parse::<ToolId>(),
            Err(UnknownToolError("cursor".to_string()))
        );
    }

    #[test]
    fn registry_is_indexed_by_tool() {
        for id in ToolId::ALL {
            assert_eq!(tool_schema(id).id(), id);
            assert_eq!(descriptor(id).id, id);
        }
    }

    #[test]
    fn field_keys_are_unique_per_tool() {
        for id in ToolId::ALL {
            let mut seen = HashSet::new();
            for field in fields(id) {
                assert!(seen.insert(field.key), "{id}: duplicate field {}", field.key);
            }
        }
    }

    #[test]
    fn defaults_match_their_field_kind() {
        for id in ToolId::ALL {
            for field in fields(id) {
                if let Some(default) = &field.default {
                    assert!(
                        field.kind.accepts(default),
                        "{id}: default for {} is a {}",
                        field.key,
                        default.kind_name()
                    );
                }
            }
        }
    }

    #[test]
    fn options_contain_the_default() {
        for id in ToolId::ALL {
            for field in fields(id).iter().filter(|f| !f.options.is_empty()) {
                if let Some(default) = field.default.as_ref().and_then(ConfigValue::as_str) {
                    assert!(field.options.contains(&default), "{id}: {}", field.key);
                }
            }
        }
    }

    #[test]
    fn model_fields_are_plain_schema_fields() {
        for id in ToolId::ALL {
            if let Some(key) = tool_schema(id).model_field {
                let field = tool_schema(id).field(key).expect("model field in schema");
                assert_eq!(field.kind, FieldKind::String, "{id}");
                assert!(!field.is_virtual, "{id}");
            }
        }
        assert_eq!(tool_schema(ToolId::Qoder).model_field, Some("ai_models.primary_model"));
        assert_eq!(tool_schema(ToolId::Copilot).model_field, None);
    }

    #[test]
    fn credential_writers_have_an_auth_file() {
        for id in ToolId::ALL {
            let schema = tool_schema(id);
            let has_auth = schema.descriptor.auxiliary_file(AuxiliaryRole::Auth).is_some();
            assert_eq!(schema.credential_writer.is_some(), has_auth, "{id}");
        }
    }

    #[test]
    fn codex_is_the_only_toml_tool() {
        for id in ToolId::ALL {
            let expected = if id == ToolId::Codex {
                ConfigFormat::Toml
            } else {
                ConfigFormat::Json
            };
            assert_eq!(descriptor(id).format, expected, "{id}");
        }
    }

    #[test]
    fn model_prefix_selector_reads_provider() {
        let mut tree = ConfigTree::new();
        path::set(&mut tree, "model", "anthropic/claude-sonnet-4".into());
        assert_eq!(
            ProviderSelector::ModelPrefix("model").read(&tree).as_deref(),
            Some("anthropic")
        );
        path::set(&mut tree, "model", "gpt-4o".into());
        assert_eq!(ProviderSelector::ModelPrefix("model").read(&tree), None);
    }
}
