//! Per-tool credential writers for tools that keep keys in a separate auth file.

use crate::error::CredentialWriteError;
use crate::merge;
use crate::tree::{ConfigTree, ConfigValue};

const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// `<provider> = { type = "api", key }` in OpenCode's auth file.
///
/// Other fields of the provider's entry, such as `address`, are kept. An empty key removes
/// the entry.
pub fn opencode(
    auth: &mut ConfigTree,
    provider: &str,
    key: &str,
) -> Result<(), CredentialWriteError> {
    let provider = provider.trim();
    if provider.is_empty() {
        return Err(CredentialWriteError::MissingProvider);
    }
    let key = key.trim();
    if key.is_empty() {
        auth.shift_remove(provider);
        return Ok(());
    }

    let mut entry = ConfigTree::new();
    entry.insert("type".to_string(), "api".into());
    entry.insert("key".to_string(), key.into());
    let mut patch = ConfigTree::new();
    patch.insert(provider.to_string(), ConfigValue::Table(entry));
    merge::merge_into(auth, &patch);
    Ok(())
}

/// Codex reads a single `OPENAI_API_KEY` whatever the provider, so `provider` is ignored.
pub fn codex(
    auth: &mut ConfigTree,
    _provider: &str,
    key: &str,
) -> Result<(), CredentialWriteError> {
    let key = key.trim();
    if key.is_empty() {
        auth.shift_remove(OPENAI_API_KEY);
    } else {
        auth.insert(OPENAI_API_KEY.to_string(), key.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{parse, ConfigFormat};

    fn json(text: &str) -> ConfigTree {
        parse(text, ConfigFormat::Json).unwrap()
    }

    #[test]
    fn opencode_upserts_and_keeps_other_providers() {
        let mut auth = json(
            r#"{"openai": {"type": "oauth", "refresh": "r"}, "moonshot": {"type": "api", "key": "old", "address": "https://m.test"}}"#,
        );
        opencode(&mut auth, "moonshot", " new ").unwrap();
        opencode(&mut auth, "deepseek", "d").unwrap();
        assert_eq!(
            auth,
            json(
                r#"{
                    "openai": {"type": "oauth", "refresh": "r"},
                    "moonshot": {"type": "api", "key": "new", "address": "https://m.test"},
                    "deepseek": {"type": "api", "key": "d"}
                }"#
            )
        );
    }

    #[test]
    fn opencode_empty_key_removes_the_entry() {
        let mut auth =
            json(r#"{"a": {"type": "api", "key": "x"}, "b": {"type": "api", "key": "y"}}"#);
        opencode(&mut auth, "a", "").unwrap();
        assert_eq!(auth, json(r#"{"b": {"type": "api", "key": "y"}}"#));
    }

    #[test]
    fn opencode_provider_keys_may_contain_dots() {
        let mut auth = ConfigTree::new();
        opencode(&mut auth, "api.example", "k").unwrap();
        assert!(auth.contains_key("api.example"));
    }

    #[test]
    fn opencode_needs_a_provider() {
        let mut auth = ConfigTree::new();
        assert_eq!(
            opencode(&mut auth, "  ", "k"),
            Err(CredentialWriteError::MissingProvider)
        );
        assert!(auth.is_empty());
    }

    #[test]
    fn codex_sets_the_key_beside_other_entries() {
        let mut auth = json(r#"{"tokens": {"id_token": "t"}, "OPENAI_API_KEY": "old"}"#);
        codex(&mut auth, "", "sk-new").unwrap();
        assert_eq!(
            auth,
            json(r#"{"tokens": {"id_token": "t"}, "OPENAI_API_KEY": "sk-new"}"#)
        );

        codex(&mut auth, "openai", "").unwrap();
        assert_eq!(auth, json(r#"{"tokens": {"id_token": "t"}}"#));
    }
}
