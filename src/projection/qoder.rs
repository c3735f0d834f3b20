use crate::schema::ToolSchema;
use crate::tree::{ConfigTree, ConfigValue};

use super::{patch_direct, project_direct, FormState, ProjectionStrategy, ReverseProjection};

/// Presents Qoder's `api_keys` map as an editable list of rows, each carrying its `name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QoderKeyList;

impl QoderKeyList {
    pub const FIELD: &'static str = "_v_api_keys";

    const SECTION: &'static str = "api_keys";
    const NAME: &'static str = "name";

    fn rows(section: &ConfigTree) -> ConfigValue {
        let rows = section
            .iter()
            .map(|(name, entry)| {
                let mut row = ConfigTree::new();
                row.insert(Self::NAME.to_string(), name.as_str().into());
                if let Some(fields) = entry.as_table() {
                    for (key, value) in fields.iter().filter(|(key, _)| *key != Self::NAME) {
                        row.insert(key.clone(), value.clone());
                    }
                }
                ConfigValue::Table(row)
            })
            .collect();
        ConfigValue::Array(rows)
    }

    fn section(rows: &[ConfigValue]) -> ConfigTree {
        let mut section = ConfigTree::new();
        for row in rows {
            let Some(fields) = row.as_table() else {
                log::debug!("qoder: ignoring api key row that is not a table");
                continue;
            };
            let Some(name) = fields
                .get(Self::NAME)
                .and_then(ConfigValue::as_non_empty_str)
            else {
                log::debug!("qoder: ignoring api key row without a name");
                continue;
            };
            let mut entry = fields.clone();
            entry.shift_remove(Self::NAME);
            section.insert(name.to_string(), ConfigValue::Table(entry));
        }
        section
    }
}

impl ProjectionStrategy for QoderKeyList {
    fn project_to_form(&self, schema: &ToolSchema, tree: &ConfigTree) -> FormState {
        let mut form = project_direct(schema, tree);
        if let Some(section) = tree.get(Self::SECTION).and_then(ConfigValue::as_table) {
            form.load(Self::FIELD, Self::rows(section));
        }
        form
    }

    fn project_from_form(
        &self,
        schema: &ToolSchema,
        form: &FormState,
        _base: &ConfigTree,
    ) -> ReverseProjection {
        let mut reverse = ReverseProjection::from_patch(patch_direct(schema, form));
        if !form.is_edited(Self::FIELD) {
            return reverse;
        }
        match form.get(Self::FIELD) {
            Some(ConfigValue::Array(rows)) => reverse
                .replacements
                .push((Self::SECTION.to_string(), ConfigValue::Table(Self::section(rows)))),
            Some(other) => log::warn!(
                "qoder: dropping `{}`, expected a list of rows but got {}",
                Self::FIELD,
                other.kind_name()
            ),
            None => {}
        }
        reverse
    }
}
