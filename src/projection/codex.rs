use crate::path;
use crate::schema::ToolSchema;
use crate::tree::{ConfigTree, ConfigValue};

use super::{patch_direct, project_direct, FormState, ProjectionStrategy, ReverseProjection};

/// Exposes the active `[model_providers.<name>]` section of Codex's TOML as two flat fields.
///
/// When the provider selection or its section fields are edited, the saved file keeps only
/// the active provider's section.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodexProviderSections;

impl CodexProviderSections {
    pub const BASE_URL: &'static str = "_v_provider.base_url";
    pub const NAME: &'static str = "_v_provider.name";

    const SELECTOR: &'static str = "model_provider";
    const SECTIONS: &'static str = "model_providers";
    const DEFAULT_PROVIDER: &'static str = "openai";

    const SECTION_FIELDS: [(&'static str, &'static str); 2] =
        [(Self::BASE_URL, "base_url"), (Self::NAME, "name")];

    fn active_provider(tree: &ConfigTree) -> &str {
        path::get(tree, Self::SELECTOR)
            .and_then(ConfigValue::as_non_empty_str)
            .unwrap_or(Self::DEFAULT_PROVIDER)
    }

    fn sections(tree: &ConfigTree) -> Option<&ConfigTree> {
        tree.get(Self::SECTIONS).and_then(ConfigValue::as_table)
    }
}

impl ProjectionStrategy for CodexProviderSections {
    fn project_to_form(&self, schema: &ToolSchema, tree: &ConfigTree) -> FormState {
        let mut form = project_direct(schema, tree);
        let section = Self::sections(tree)
            .and_then(|sections| sections.get(Self::active_provider(tree)))
            .and_then(ConfigValue::as_table);
        for (form_key, section_key) in Self::SECTION_FIELDS {
            let value = section
                .and_then(|section| section.get(section_key))
                .and_then(ConfigValue::as_str)
                .unwrap_or_default();
            form.load(form_key, value.into());
        }
        form
    }

    fn project_from_form(
        &self,
        schema: &ToolSchema,
        form: &FormState,
        base: &ConfigTree,
    ) -> ReverseProjection {
        let mut reverse = ReverseProjection::from_patch(patch_direct(schema, form));
        let touched = form.is_edited(Self::SELECTOR)
            || Self::SECTION_FIELDS
                .iter()
                .any(|(form_key, _)| form.is_edited(form_key));
        if !touched {
            return reverse;
        }

        let provider = form
            .get(Self::SELECTOR)
            .and_then(ConfigValue::as_non_empty_str)
            .unwrap_or_else(|| Self::active_provider(base))
            .to_string();

        if let Some(sections) = Self::sections(base) {
            let stale: Vec<String> = sections
                .keys()
                .filter(|name| **name != provider)
                .map(|name| path::join([Self::SECTIONS, name.as_str()]))
                .collect();
            if !stale.is_empty() {
                log::debug!(
                    "codex: dropping {} inactive provider section(s), keeping `{provider}`",
                    stale.len()
                );
            }
            reverse.removals = stale;
        }

        for (form_key, section_key) in Self::SECTION_FIELDS {
            let Some(value) = form.get_str(form_key) else {
                continue;
            };
            if form.is_edited(form_key) || !value.trim().is_empty() {
                let target = path::join([Self::SECTIONS, provider.as_str(), section_key]);
                path::set(&mut reverse.patch, &target, value.into());
            }
        }
        reverse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{parse, serialize, ConfigFormat};
    use crate::schema::{tool_schema, ToolId};

    const BASE: &str = r#"model_provider = "openai"
model = "gpt-5"

[model_providers.openai]
base_url = "u1"

[model_providers.anthropic]
base_url = "old"
name = "Anthropic"
"#;

    fn toml(text: &str) -> ConfigTree {
        parse(text, ConfigFormat::Toml).unwrap()
    }

    fn save(base: &ConfigTree, edits: &[(&str, &str)]) -> ConfigTree {
        let schema = tool_schema(ToolId::Codex);
        let mut form = schema.projection.project_to_form(schema, base);
        for (key, value) in edits {
            form.edit(*key, (*value).into());
        }
        schema
            .projection
            .project_from_form(schema, &form, base)
            .apply_to(base)
    }

    #[test]
    fn active_section_is_projected_into_virtual_fields() {
        let schema = tool_schema(ToolId::Codex);
        let base = toml(BASE);
        let form = schema.projection.project_to_form(schema, &base);
        assert_eq!(form.get_str(CodexProviderSections::BASE_URL), Some("u1"));
        assert_eq!(form.get_str(CodexProviderSections::NAME), Some(""));
        assert_eq!(form.get_str("model_provider"), Some("openai"));
    }

    #[test]
    fn missing_section_projects_empty_strings() {
        let schema = tool_schema(ToolId::Codex);
        let form = schema.projection.project_to_form(schema, &ConfigTree::new());
        assert_eq!(form.get_str(CodexProviderSections::BASE_URL), Some(""));
        assert_eq!(form.get("model_provider"), None);
    }

    #[test]
    fn switching_provider_keeps_only_the_active_section() {
        let saved = save(
            &toml(BASE),
            &[
                ("model_provider", "anthropic"),
                (CodexProviderSections::BASE_URL, "u2"),
            ],
        );
        let expected = toml(
            r#"model_provider = "anthropic"
model = "gpt-5"

[model_providers.anthropic]
base_url = "u2"
name = "Anthropic"
"#,
        );
        assert_eq!(saved, expected);
        assert!(!serialize(&saved, ConfigFormat::Toml).unwrap().contains("_v_"));
    }

    #[test]
    fn editing_unrelated_fields_keeps_every_section() {
        let base = toml(BASE);
        let saved = save(&base, &[("model", "o3")]);
        assert_eq!(saved.get("model_providers"), base.get("model_providers"));
        assert_eq!(path::get_str(&saved, "model"), Some("o3"));
    }

    #[test]
    fn empty_unedited_name_is_not_written() {
        let saved = save(&toml(BASE), &[(CodexProviderSections::BASE_URL, "u3")]);
        assert_eq!(
            saved,
            toml(
                r#"model_provider = "openai"
model = "gpt-5"

[model_providers.openai]
base_url = "u3"
"#
            )
        );
    }

    #[test]
    fn switching_provider_carries_the_form_section_values() {
        let base = toml(BASE);
        let saved = save(
            &base,
            &[("model_provider", "anthropic"), (CodexProviderSections::NAME, "")],
        );
        assert_eq!(
            path::get_str(&saved, "model_providers.anthropic.name"),
            Some("")
        );
        assert_eq!(
            path::get_str(&saved, "model_providers.anthropic.base_url"),
            Some("u1")
        );
    }

    #[test]
    fn new_provider_gets_a_fresh_section() {
        let saved = save(
            &ConfigTree::new(),
            &[
                ("model_provider", "azure"),
                (CodexProviderSections::BASE_URL, "https://example.azure.com/v1"),
            ],
        );
        assert_eq!(
            saved,
            toml(
                r#"model_provider = "azure"

[model_providers.azure]
base_url = "https://example.azure.com/v1"
"#
            )
        );
    }
}
