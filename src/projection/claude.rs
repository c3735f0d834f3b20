use crate::path;
use crate::schema::ToolSchema;
use crate::tree::ConfigTree;

use super::{patch_direct, project_direct, FormState, ProjectionStrategy, ReverseProjection};

/// Keeps Claude's top-level `model` and the `env.ANTHROPIC_MODEL` override in step.
///
/// The environment override wins at runtime, so the form shows it under `model` when set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaudeModelMirror;

impl ClaudeModelMirror {
    const MODEL: &'static str = "model";
    const ENV_MODEL: &'static str = "env.ANTHROPIC_MODEL";
}

impl ProjectionStrategy for ClaudeModelMirror {
    fn project_to_form(&self, schema: &ToolSchema, tree: &ConfigTree) -> FormState {
        let mut form = project_direct(schema, tree);
        if let Some(model) = path::get(tree, Self::ENV_MODEL).and_then(|v| v.as_non_empty_str()) {
            form.load(Self::MODEL, model.into());
        }
        form
    }

    fn project_from_form(
        &self,
        schema: &ToolSchema,
        form: &FormState,
        base: &ConfigTree,
    ) -> ReverseProjection {
        let mut patch = patch_direct(schema, form);
        let model_edited = form.is_edited(Self::MODEL);
        let env_edited = form.is_edited(Self::ENV_MODEL);

        if env_edited && !model_edited {
            if let Some(value) = path::get(&patch, Self::ENV_MODEL).cloned() {
                path::set(&mut patch, Self::MODEL, value);
            }
        } else if model_edited && !env_edited {
            let has_override = path::get(base, Self::ENV_MODEL)
                .and_then(|v| v.as_non_empty_str())
                .is_some();
            if has_override {
                if let Some(value) = path::get(&patch, Self::MODEL).cloned() {
                    path::set(&mut patch, Self::ENV_MODEL, value);
                }
            }
        }
        ReverseProjection::from_patch(patch)
    }
}
