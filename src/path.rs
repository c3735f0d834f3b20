//! Dotted-path access into a [`ConfigTree`].
//!
//! A path is a list of keys joined with `.`. A key that itself contains a `.` is written with
//! `\.`, and a literal backslash as `\\`. Paths without backslashes split exactly on `.`.
//!
//! Writes follow a "last writer wins, structural" policy: when an intermediate segment holds a
//! scalar or array, [`set`] replaces it with an empty table before descending.

use crate::tree::{ConfigTree, ConfigValue};

/// Splits a dotted path into its unescaped segments.
pub fn segments(path: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(next) => current.push(next),
                None => current.push('\\'),
            },
            '.' => out.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    out.push(current);
    out
}

/// Escapes a single key so it can be embedded in a dotted path.
pub fn escape_segment(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for ch in key.chars() {
        if ch == '.' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Joins raw keys into a dotted path, escaping as needed.
pub fn join<I, S>(keys: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keys.into_iter()
        .map(|key| escape_segment(key.as_ref()))
        .collect::<Vec<_>>()
        .join(".")
}

pub fn get<'a>(tree: &'a ConfigTree, path: &str) -> Option<&'a ConfigValue> {
    if path.is_empty() {
        return None;
    }
    let segments = segments(path);
    let (leaf, parents) = segments.split_last()?;
    let mut current = tree;
    for segment in parents {
        current = current.get(segment)?.as_table()?;
    }
    current.get(leaf)
}

/// Convenience for string leaves.
pub fn get_str<'a>(tree: &'a ConfigTree, path: &str) -> Option<&'a str> {
    get(tree, path).and_then(ConfigValue::as_str)
}

/// Writes `value` at `path`, creating (or structurally replacing) intermediate tables.
///
/// Existing keys keep their position; new keys are appended.
pub fn set(tree: &mut ConfigTree, path: &str, value: ConfigValue) {
    if path.is_empty() {
        return;
    }
    let segments = segments(path);
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };
    let mut current = tree;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(ConfigValue::empty_table);
        current = ensure_table(slot);
    }
    current.insert(leaf.clone(), value);
}

/// Removes the value at `path`, leaving its (possibly now empty) parents in place.
pub fn remove(tree: &mut ConfigTree, path: &str) -> Option<ConfigValue> {
    if path.is_empty() {
        return None;
    }
    let segments = segments(path);
    let (leaf, parents) = segments.split_last()?;
    let mut current = tree;
    for segment in parents {
        current = current.get_mut(segment)?.as_table_mut()?;
    }
    current.shift_remove(leaf)
}

fn ensure_table(slot: &mut ConfigValue) -> &mut ConfigTree {
    if !slot.is_table() {
        log::debug!(
            "replacing {} with a table to continue a dotted-path write",
            slot.kind_name()
        );
        *slot = ConfigValue::empty_table();
    }
    match slot {
        ConfigValue::Table(table) => table,
        _ => unreachable!("slot was replaced by a table above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{parse, ConfigFormat};

    fn json(text: &str) -> ConfigTree {
        parse(text, ConfigFormat::Json).unwrap()
    }

    #[test]
    fn set_auto_vivifies_intermediate_tables() {
        let mut tree = ConfigTree::new();
        set(&mut tree, "a.b.c", ConfigValue::Integer(5));
        assert_eq!(tree, json(r#"{"a":{"b":{"c":5}}}"#));
    }

    #[test]
    fn set_replaces_scalar_intermediates() {
        let mut tree = json(r#"{"a": "scalar", "keep": 1}"#);
        set(&mut tree, "a.b", true.into());
        assert_eq!(tree, json(r#"{"a": {"b": true}, "keep": 1}"#));
    }

    #[test]
    fn set_keeps_position_of_existing_keys() {
        let mut tree = json(r#"{"first": 1, "second": 2, "third": 3}"#);
        set(&mut tree, "second", "two".into());
        let keys: Vec<_> = tree.keys().map(String::as_str).collect();
        assert_eq!(keys, ["first", "second", "third"]);
    }

    #[test]
    fn get_walks_nested_tables_only() {
        let tree = json(r#"{"env": {"ANTHROPIC_MODEL": "opus"}, "list": [{"a": 1}]}"#);
        assert_eq!(get_str(&tree, "env.ANTHROPIC_MODEL"), Some("opus"));
        assert_eq!(get(&tree, "env.MISSING"), None);
        assert_eq!(get(&tree, "list.a"), None);
        assert_eq!(get(&tree, ""), None);
    }

    #[test]
    fn escaped_dots_address_literal_keys() {
        let mut tree = ConfigTree::new();
        set(&mut tree, r"provider.api\.example\.com.key", "k".into());
        assert_eq!(
            tree,
            json(r#"{"provider": {"api.example.com": {"key": "k"}}}"#)
        );
        assert_eq!(
            join(["provider", "api.example.com", "key"]),
            r"provider.api\.example\.com.key"
        );
        assert_eq!(segments(r"a\\b.c"), vec![r"a\b".to_string(), "c".to_string()]);
    }

    #[test]
    fn remove_returns_the_value_and_keeps_parents() {
        let mut tree = json(r#"{"a": {"b": 1, "c": 2}}"#);
        assert_eq!(remove(&mut tree, "a.b"), Some(ConfigValue::Integer(1)));
        assert_eq!(tree, json(r#"{"a": {"c": 2}}"#));
        assert_eq!(remove(&mut tree, "a.missing.deeper"), None);
    }
}
