//! Deep merge of a sparse patch into a previously loaded tree.
//!
//! Keys missing from the patch are "not submitted" and never touch the base. Tables merge
//! recursively; every other value (scalars, arrays, or a kind mismatch) replaces the base value
//! outright. Clearing a field therefore requires an explicit empty value in the patch.

use crate::tree::{ConfigTree, ConfigValue};

/// Returns `base` with `patch` merged in. Neither input is modified.
pub fn merge(base: &ConfigTree, patch: &ConfigTree) -> ConfigTree {
    let mut merged = base.clone();
    merge_into(&mut merged, patch);
    merged
}

/// In-place variant of [`merge`].
pub fn merge_into(target: &mut ConfigTree, patch: &ConfigTree) {
    for (key, incoming) in patch {
        match (target.get_mut(key), incoming) {
            (Some(ConfigValue::Table(existing)), ConfigValue::Table(nested)) => {
                merge_into(existing, nested)
            }
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{parse, ConfigFormat};
    use crate::tree::strategies::tree;
    use proptest::prelude::*;

    fn json(text: &str) -> ConfigTree {
        parse(text, ConfigFormat::Json).unwrap()
    }

    #[test]
    fn nested_tables_merge_recursively() {
        let merged = merge(&json(r#"{"a":{"x":1,"y":2}}"#), &json(r#"{"a":{"y":3}}"#));
        assert_eq!(merged, json(r#"{"a":{"x":1,"y":3}}"#));
    }

    #[test]
    fn arrays_replace_instead_of_concatenating() {
        let merged = merge(
            &json(r#"{"instructions": ["a", "b"]}"#),
            &json(r#"{"instructions": ["c"]}"#),
        );
        assert_eq!(merged, json(r#"{"instructions": ["c"]}"#));
    }

    #[test]
    fn kind_mismatch_takes_the_patch_value() {
        let merged = merge(&json(r#"{"a": {"x": 1}}"#), &json(r#"{"a": "flat"}"#));
        assert_eq!(merged, json(r#"{"a": "flat"}"#));
        let merged = merge(&json(r#"{"a": "flat"}"#), &json(r#"{"a": {"x": 1}}"#));
        assert_eq!(merged, json(r#"{"a": {"x": 1}}"#));
    }

    #[test]
    fn explicit_empty_values_clear_fields() {
        let merged = merge(
            &json(r#"{"model": "a", "list": [1]}"#),
            &json(r#"{"model": "", "list": []}"#),
        );
        assert_eq!(merged, json(r#"{"model": "", "list": []}"#));
    }

    #[test]
    fn new_keys_are_appended_after_existing_ones() {
        let merged = merge(&json(r#"{"b": 1, "a": 2}"#), &json(r#"{"c": 3, "a": 4}"#));
        let keys: Vec<_> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    proptest! {
        #[test]
        fn empty_patch_is_identity(base in tree()) {
            prop_assert_eq!(merge(&base, &ConfigTree::new()), base);
        }

        #[test]
        fn keys_absent_from_patch_survive(base in tree(), patch in tree()) {
            let merged = merge(&base, &patch);
            for (key, value) in &base {
                if !patch.contains_key(key) {
                    prop_assert_eq!(merged.get(key), Some(value));
                }
            }
        }

        #[test]
        fn non_table_patch_values_win(base in tree(), patch in tree()) {
            let merged = merge(&base, &patch);
            for (key, value) in &patch {
                if !value.is_table() {
                    prop_assert_eq!(merged.get(key), Some(value));
                }
            }
        }

        #[test]
        fn merging_twice_is_idempotent(base in tree(), patch in tree()) {
            let once = merge(&base, &patch);
            prop_assert_eq!(merge(&once, &patch), once);
        }
    }
}
