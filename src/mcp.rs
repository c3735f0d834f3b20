//! Read-only listing of the MCP servers each tool is configured to launch.

use indexmap::IndexMap;

use crate::schema::ToolId;
use crate::tree::{ConfigTree, ConfigValue};

/// Where a tool keeps its MCP server table and how each entry spells its command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpLayout {
    /// `{ command = "npx", args = [..], env = {..} }` entries under the given key
    CommandArgs(&'static str),
    /// `{ command = ["npx", ..], environment = {..} }` entries under the given key
    CommandVector(&'static str),
}

/// One configured MCP server, normalized across tools.
#[derive(Debug, Clone, PartialEq)]
pub struct McpServer {
    pub tool: ToolId,
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: IndexMap<String, String>,
}

impl McpLayout {
    pub fn table_key(&self) -> &'static str {
        match self {
            McpLayout::CommandArgs(key) | McpLayout::CommandVector(key) => *key,
        }
    }

    /// Lists the servers in `tree`. Entries without a command are skipped.
    pub fn servers(&self, tool: ToolId, tree: &ConfigTree) -> Vec<McpServer> {
        let Some(table) = tree.get(self.table_key()).and_then(ConfigValue::as_table) else {
            return Vec::new();
        };
        table
            .iter()
            .filter_map(|(name, entry)| {
                let entry = entry.as_table()?;
                let (command, args, env) = match self {
                    McpLayout::CommandArgs(_) => (
                        entry.get("command")?.as_non_empty_str()?.to_string(),
                        strings(entry.get("args")),
                        string_map(entry.get("env")),
                    ),
                    McpLayout::CommandVector(_) => {
                        let mut parts = strings(entry.get("command")).into_iter();
                        let command = parts.next().filter(|c| !c.trim().is_empty())?;
                        (command, parts.collect(), string_map(entry.get("environment")))
                    }
                };
                Some(McpServer {
                    tool,
                    name: name.clone(),
                    command,
                    args,
                    env,
                })
            })
            .collect()
    }
}

fn strings(value: Option<&ConfigValue>) -> Vec<String> {
    value
        .and_then(ConfigValue::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(ConfigValue::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn string_map(value: Option<&ConfigValue>) -> IndexMap<String, String> {
    value
        .and_then(ConfigValue::as_table)
        .map(|table| {
            table
                .iter()
                .filter_map(|(key, value)| Some((key.clone(), value.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{parse, ConfigFormat};

    #[test]
    fn command_args_entries_are_listed_in_order() {
        let tree = parse(
            r#"{"mcpServers": {
                "fs": {"command": "npx", "args": ["-y", "server-fs"], "env": {"ROOT": "/tmp"}},
                "broken": {"args": ["x"]},
                "git": {"command": "uvx"}
            }}"#,
            ConfigFormat::Json,
        )
        .unwrap();
        let servers = McpLayout::CommandArgs("mcpServers").servers(ToolId::Claude, &tree);
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].name, "fs");
        assert_eq!(servers[0].args, ["-y", "server-fs"]);
        assert_eq!(servers[0].env.get("ROOT").map(String::as_str), Some("/tmp"));
        assert_eq!(servers[1].command, "uvx");
        assert!(servers[1].args.is_empty());
    }

    #[test]
    fn command_vector_splits_program_from_arguments() {
        let tree = parse(
            r#"{"mcp": {"ctx": {"type": "local", "command": ["bunx", "ctx7", "--port", "1"], "environment": {"K": "v"}}, "empty": {"command": []}}}"#,
            ConfigFormat::Json,
        )
        .unwrap();
        let servers = McpLayout::CommandVector("mcp").servers(ToolId::OpenCode, &tree);
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].command, "bunx");
        assert_eq!(servers[0].args, ["ctx7", "--port", "1"]);
        assert_eq!(servers[0].env.get("K").map(String::as_str), Some("v"));
    }

    #[test]
    fn codex_toml_tables_are_read() {
        let tree = parse(
            "[mcp_servers.docs]\ncommand = \"docs-mcp\"\nargs = [\"serve\"]\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        let servers = McpLayout::CommandArgs("mcp_servers").servers(ToolId::Codex, &tree);
        assert_eq!(servers[0].tool, ToolId::Codex);
        assert_eq!(servers[0].command, "docs-mcp");
    }

    #[test]
    fn missing_table_lists_nothing() {
        assert!(McpLayout::CommandArgs("mcpServers")
            .servers(ToolId::Gemini, &ConfigTree::new())
            .is_empty());
    }
}
