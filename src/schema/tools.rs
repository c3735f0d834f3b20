use crate::credentials::{extract, write};
use crate::format::ConfigFormat;
use crate::mcp::McpLayout;
use crate::projection::{ClaudeModelMirror, CodexProviderSections, DirectProjection, QoderKeyList};

use super::{
    AuxiliaryFile, AuxiliaryRole, ProviderSelector, SchemaField, ToolConfigDescriptor, ToolId,
    ToolSchema,
};

const PERMISSION_MODES: &[&str] = &["ask", "allow", "deny"];
const REASONING_EFFORTS: &[&str] = &["high", "medium", "low"];

const OPENCODE_AUX: &[AuxiliaryFile] = &[AuxiliaryFile {
    role: AuxiliaryRole::Auth,
    path: "~/.local/share/opencode/auth.json",
    format: ConfigFormat::Json,
}];

const CODEX_AUX: &[AuxiliaryFile] = &[AuxiliaryFile {
    role: AuxiliaryRole::Auth,
    path: "~/.codex/auth.json",
    format: ConfigFormat::Json,
}];

pub(super) fn build(id: ToolId) -> ToolSchema {
    match id {
        ToolId::Claude => claude(),
        ToolId::Gemini => gemini(),
        ToolId::OpenCode => opencode(),
        ToolId::Qoder => qoder(),
        ToolId::CodeBuddy => codebuddy(),
        ToolId::Copilot => copilot(),
        ToolId::Codex => codex(),
    }
}

fn json_descriptor(id: ToolId, primary_path: &'static str) -> ToolConfigDescriptor {
    ToolConfigDescriptor {
        id,
        primary_path,
        format: ConfigFormat::Json,
        auxiliary: &[],
    }
}

fn claude() -> ToolSchema {
    ToolSchema {
        descriptor: json_descriptor(ToolId::Claude, "~/.claude.json"),
        fields: vec![
            SchemaField::string("model", "aiSettings.cliConfig.fields.model"),
            SchemaField::string("env.ANTHROPIC_AUTH_TOKEN", "aiSettings.cliConfig.fields.apiKey")
                .secret(),
            SchemaField::string("env.ANTHROPIC_BASE_URL", "aiSettings.cliConfig.fields.baseUrl")
                .with_default("https://api.anthropic.com"),
            SchemaField::string("env.ANTHROPIC_MODEL", "aiSettings.cliConfig.fields.model"),
            SchemaField::string(
                "env.MAX_THINKING_TOKENS",
                "aiSettings.cliConfig.fields.maxThinkingTokens",
            ),
            SchemaField::string("env.HTTP_PROXY", "aiSettings.cliConfig.fields.httpProxy"),
            SchemaField::string(
                "env.DISABLE_AUTOUPDATER",
                "aiSettings.cliConfig.fields.disableAutoUpdater",
            )
            .with_options(&["true", "false"])
            .with_default("false"),
            SchemaField::string(
                "env.DISABLE_TELEMETRY",
                "aiSettings.cliConfig.fields.disableTelemetry",
            )
            .with_options(&["true", "false"])
            .with_default("false"),
            SchemaField::string(
                "env.DISABLE_PROMPT_CACHING",
                "aiSettings.cliConfig.fields.disablePromptCaching",
            )
            .with_options(&["true", "false"])
            .with_default("false"),
            SchemaField::boolean("verbose", "aiSettings.cliConfig.fields.verbose")
                .with_default(false)
                .describe("aiSettings.cliConfig.descriptions.verbose"),
            SchemaField::string("theme", "aiSettings.cliConfig.fields.theme")
                .with_options(&["dark", "light", "system"])
                .with_default("system"),
            SchemaField::string("language", "aiSettings.cliConfig.fields.language"),
            SchemaField::boolean(
                "alwaysThinkingEnabled",
                "aiSettings.cliConfig.fields.alwaysThinking",
            )
            .with_default(false),
            SchemaField::number(
                "cleanupPeriodDays",
                "aiSettings.cliConfig.fields.cleanupPeriodDays",
            )
            .with_default(30i64),
            SchemaField::string(
                "permissions.defaultMode",
                "aiSettings.cliConfig.fields.defaultMode",
            )
            .with_options(&["default", "acceptEdits", "plan", "bypassPermissions"])
            .with_default("default"),
            SchemaField::string_array(
                "permissions.allow",
                "aiSettings.cliConfig.fields.permissionsAllow",
            ),
            SchemaField::string_array(
                "permissions.deny",
                "aiSettings.cliConfig.fields.permissionsDeny",
            ),
            SchemaField::string_array(
                "permissions.additionalDirectories",
                "aiSettings.cliConfig.fields.additionalDirectories",
            ),
            SchemaField::boolean("sandbox.enabled", "aiSettings.cliConfig.fields.sandbox")
                .with_default(false),
            SchemaField::string_array(
                "sandbox.excludedCommands",
                "aiSettings.cliConfig.fields.excludedCommands",
            ),
        ],
        provider_selector: None,
        projection: Box::new(ClaudeModelMirror),
        credentials: extract::claude,
        credential_writer: None,
        model_field: Some("model"),
        mcp: McpLayout::CommandArgs("mcpServers"),
    }
}

fn gemini() -> ToolSchema {
    ToolSchema {
        descriptor: json_descriptor(ToolId::Gemini, "~/.gemini/settings.json"),
        fields: vec![
            SchemaField::string("apiKey", "cliConfig.fields.apiKey").secret(),
            SchemaField::string("model", "aiSettings.cliConfig.fields.model")
                .with_options(&["gemini-1.5-pro", "gemini-1.5-flash", "gemini-1.0-pro"])
                .with_default("gemini-1.5-pro"),
            SchemaField::number("temperature", "aiSettings.cliConfig.fields.temperature")
                .with_default(0.9)
                .describe("aiSettings.cliConfig.descriptions.randomness"),
            SchemaField::number("maxOutputTokens", "aiSettings.cliConfig.fields.maxOutputTokens")
                .with_default(8192i64),
            SchemaField::number("topP", "aiSettings.cliConfig.fields.topP").with_default(0.95),
            SchemaField::number("topK", "aiSettings.cliConfig.fields.topK").with_default(40i64),
            SchemaField::boolean("autoAccept", "cliConfig.fields.autoAccept").with_default(false),
            SchemaField::boolean("sandbox", "cliConfig.fields.sandbox").with_default(false),
            SchemaField::number("maxSessionTurns", "cliConfig.fields.maxSessionTurns"),
            SchemaField::string("safetySettings.harassment", "cliConfig.fields.harassment"),
            SchemaField::string(
                "safetySettings.dangerousContent",
                "cliConfig.fields.dangerousContent",
            ),
            SchemaField::boolean(
                "fileFiltering.respectGitIgnore",
                "cliConfig.fields.respectGitIgnore",
            )
            .with_default(true),
            SchemaField::boolean("telemetry.enabled", "cliConfig.fields.telemetry")
                .with_default(false),
            SchemaField::string("telemetry.otlpEndpoint", "cliConfig.fields.otlpEndpoint"),
            SchemaField::number(
                "chatCompression.contextPercentageThreshold",
                "cliConfig.fields.compressionThreshold",
            ),
        ],
        provider_selector: None,
        projection: Box::new(DirectProjection),
        credentials: extract::gemini,
        credential_writer: None,
        model_field: Some("model"),
        mcp: McpLayout::CommandArgs("mcpServers"),
    }
}

fn opencode() -> ToolSchema {
    ToolSchema {
        descriptor: ToolConfigDescriptor {
            id: ToolId::OpenCode,
            primary_path: "~/.config/opencode/opencode.json",
            format: ConfigFormat::Json,
            auxiliary: OPENCODE_AUX,
        },
        fields: vec![
            SchemaField::string("model", "aiSettings.cliConfig.fields.model")
                .with_default("gpt-4o")
                .describe("aiSettings.cliConfig.descriptions.providerModel"),
            SchemaField::string("theme", "aiSettings.cliConfig.fields.theme")
                .with_options(&["opencode", "dark", "light", "dracula", "monokai"])
                .with_default("opencode"),
            SchemaField::boolean("autoupdate", "aiSettings.cliConfig.fields.autoUpdate")
                .with_default(true),
            SchemaField::string("default_agent", "aiSettings.cliConfig.fields.defaultAgent")
                .with_options(&["plan", "code", "chat"])
                .with_default("plan"),
            SchemaField::string_array("instructions", "aiSettings.cliConfig.fields.instructions"),
            SchemaField::string_array(
                "disabled_providers",
                "aiSettings.cliConfig.fields.disabledProviders",
            ),
            SchemaField::number("server.port", "aiSettings.cliConfig.fields.server.port")
                .with_default(4096i64),
            SchemaField::string("server.hostname", "aiSettings.cliConfig.fields.server.hostname")
                .with_default("0.0.0.0"),
            SchemaField::boolean("server.mdns", "aiSettings.cliConfig.fields.server.mdns")
                .with_default(true),
            SchemaField::string_array("server.cors", "aiSettings.cliConfig.fields.server.cors"),
            SchemaField::number("tui.scroll_speed", "aiSettings.cliConfig.fields.tui.scrollSpeed")
                .with_default(3i64),
            SchemaField::string("tui.diff_style", "aiSettings.cliConfig.fields.tui.diffStyle")
                .with_options(&["auto", "side-by-side", "inline"])
                .with_default("auto"),
            SchemaField::boolean("tools.write", "aiSettings.cliConfig.fields.tools.write")
                .with_default(true),
            SchemaField::boolean("tools.bash", "aiSettings.cliConfig.fields.tools.bash")
                .with_default(true),
            SchemaField::string("permission.edit", "aiSettings.cliConfig.fields.permission.edit")
                .with_options(PERMISSION_MODES)
                .with_default("ask"),
            SchemaField::string("permission.bash", "aiSettings.cliConfig.fields.permission.bash")
                .with_options(PERMISSION_MODES)
                .with_default("ask"),
            SchemaField::boolean("compaction.auto", "aiSettings.cliConfig.fields.compaction.auto")
                .with_default(true),
            SchemaField::boolean("compaction.prune", "aiSettings.cliConfig.fields.compaction.prune")
                .with_default(true),
            SchemaField::number(
                "provider.anthropic.options.timeout",
                "aiSettings.cliConfig.fields.provider.timeout",
            )
            .with_default(600_000i64),
        ],
        provider_selector: Some(ProviderSelector::ModelPrefix("model")),
        projection: Box::new(DirectProjection),
        credentials: extract::opencode,
        credential_writer: Some(write::opencode),
        model_field: Some("model"),
        mcp: McpLayout::CommandVector("mcp"),
    }
}

fn qoder() -> ToolSchema {
    ToolSchema {
        descriptor: json_descriptor(ToolId::Qoder, "~/.qoder/settings.json"),
        fields: vec![
            SchemaField::group(QoderKeyList::FIELD, "cliConfig.qoder.sections.apiKeys")
                .describe("cliConfig.qoder.descriptions.apiKeys")
                .secret(),
            SchemaField::boolean("autoUpdate", "aiSettings.cliConfig.fields.autoUpdate")
                .with_default(true),
            SchemaField::string("language", "aiSettings.cliConfig.fields.language")
                .with_options(&["en", "zh"])
                .with_default("en"),
            SchemaField::boolean("privacy.telemetry", "aiSettings.cliConfig.fields.telemetry")
                .with_default(true),
            SchemaField::string(
                "permissions.default",
                "aiSettings.cliConfig.fields.defaultPermission",
            )
            .with_options(PERMISSION_MODES)
            .with_default("ask"),
            SchemaField::string("ai_models.primary_model", "cliConfig.qoder.fields.primaryModel"),
            SchemaField::string("ai_models.fallback_model", "cliConfig.qoder.fields.fallbackModel"),
            SchemaField::boolean(
                "ai_models.auto_model_selection",
                "cliConfig.qoder.fields.autoModelSelection",
            )
            .with_default(false),
            SchemaField::number(
                "model_parameters.temperature",
                "cliConfig.qoder.fields.temperature",
            ),
            SchemaField::number("model_parameters.max_tokens", "cliConfig.qoder.fields.maxTokens"),
            SchemaField::string_array(
                "model_parameters.stop_sequences",
                "cliConfig.qoder.fields.stopSequences",
            ),
            SchemaField::boolean("network.proxy.enabled", "cliConfig.qoder.fields.proxyEnabled")
                .with_default(false),
            SchemaField::string("network.proxy.host", "cliConfig.qoder.fields.host"),
            SchemaField::number("network.proxy.port", "cliConfig.qoder.fields.port"),
            SchemaField::number("editor.font.size", "cliConfig.qoder.fields.fontSize"),
            SchemaField::string("editor.theme.mode", "cliConfig.qoder.fields.themeMode")
                .with_options(&["auto", "light", "dark"])
                .with_default("auto"),
        ],
        provider_selector: None,
        projection: Box::new(QoderKeyList),
        credentials: extract::qoder,
        credential_writer: None,
        model_field: Some("ai_models.primary_model"),
        mcp: McpLayout::CommandArgs("mcp"),
    }
}

fn codebuddy() -> ToolSchema {
    ToolSchema {
        descriptor: json_descriptor(ToolId::CodeBuddy, "~/.codebuddy/settings.json"),
        fields: vec![
            SchemaField::string(
                "env.CODEBUDDY_API_KEY",
                "aiSettings.cliConfig.codebuddy.fields.apiKey",
            )
            .secret(),
            SchemaField::string(
                "env.CODEBUDDY_BASE_URL",
                "aiSettings.cliConfig.codebuddy.fields.baseUrl",
            ),
            SchemaField::string(
                "env.CODEBUDDY_AUTH_TOKEN",
                "aiSettings.cliConfig.codebuddy.fields.authToken",
            )
            .secret(),
            SchemaField::string(
                "env.CODEBUDDY_INTERNET_ENVIRONMENT",
                "aiSettings.cliConfig.codebuddy.fields.internetEnv",
            ),
            SchemaField::string("model", "aiSettings.cliConfig.fields.model")
                .with_default("hunyuan-pro"),
            SchemaField::string("language", "aiSettings.cliConfig.fields.language")
                .with_options(&["zh-CN", "en-US"])
                .with_default("zh-CN"),
            SchemaField::boolean(
                "alwaysThinkingEnabled",
                "aiSettings.cliConfig.fields.alwaysThinking",
            )
            .with_default(false),
            SchemaField::boolean(
                "autoCompactEnabled",
                "aiSettings.cliConfig.codebuddy.fields.autoCompact",
            )
            .with_default(true),
            SchemaField::number(
                "cleanupPeriodDays",
                "aiSettings.cliConfig.fields.cleanupPeriodDays",
            ),
            SchemaField::string(
                "permissions.defaultMode",
                "aiSettings.cliConfig.fields.defaultMode",
            ),
            SchemaField::boolean("sandbox.enabled", "aiSettings.cliConfig.fields.sandbox")
                .with_default(false),
            SchemaField::string(
                "statusLine.type",
                "aiSettings.cliConfig.codebuddy.fields.statusLineType",
            ),
            SchemaField::string(
                "statusLine.command",
                "aiSettings.cliConfig.codebuddy.fields.statusLineCommand",
            ),
        ],
        provider_selector: None,
        projection: Box::new(DirectProjection),
        credentials: extract::codebuddy,
        credential_writer: None,
        model_field: Some("model"),
        mcp: McpLayout::CommandArgs("mcpServers"),
    }
}

fn copilot() -> ToolSchema {
    ToolSchema {
        descriptor: json_descriptor(ToolId::Copilot, "~/.copilot/config.json"),
        fields: vec![
            SchemaField::string("editor", "aiSettings.cliConfig.fields.editor")
                .with_default("code"),
            SchemaField::boolean("debug", "aiSettings.cliConfig.fields.debugMode")
                .with_default(false),
            SchemaField::boolean("confirm_execute", "aiSettings.cliConfig.fields.confirmExecute")
                .with_default(true)
                .describe("aiSettings.cliConfig.descriptions.confirmExecute"),
            SchemaField::string("github.token", "aiSettings.cliConfig.fields.githubToken")
                .describe("aiSettings.cliConfig.descriptions.githubToken")
                .secret(),
        ],
        provider_selector: None,
        projection: Box::new(DirectProjection),
        credentials: extract::none,
        credential_writer: None,
        model_field: None,
        mcp: McpLayout::CommandArgs("mcpServers"),
    }
}

fn codex() -> ToolSchema {
    ToolSchema {
        descriptor: ToolConfigDescriptor {
            id: ToolId::Codex,
            primary_path: "~/.codex/config.toml",
            format: ConfigFormat::Toml,
            auxiliary: CODEX_AUX,
        },
        fields: vec![
            SchemaField::string("model_provider", "aiSettings.cliConfig.fields.modelProvider")
                .with_options(&["openai", "anthropic"])
                .with_default("openai")
                .describe("aiSettings.cliConfig.descriptions.modelProvider"),
            SchemaField::string(
                CodexProviderSections::BASE_URL,
                "aiSettings.cliConfig.fields.provider.baseUrl",
            )
            .with_default("https://api.url/v1"),
            SchemaField::string(
                CodexProviderSections::NAME,
                "aiSettings.cliConfig.fields.provider.name",
            )
            .with_default(""),
            SchemaField::string("model", "aiSettings.cliConfig.fields.model").with_default(""),
            SchemaField::string(
                "model_reasoning_effort",
                "aiSettings.cliConfig.fields.reasoningEffort",
            )
            .with_options(REASONING_EFFORTS)
            .with_default("high"),
            SchemaField::boolean(
                "disable_response_storage",
                "aiSettings.cliConfig.fields.disableResponseStorage",
            )
            .with_default(true),
            SchemaField::string(
                "preferred_auth_method",
                "aiSettings.cliConfig.fields.preferredAuthMethod",
            )
            .with_options(&["apikey", "oauth"])
            .with_default("apikey"),
        ],
        provider_selector: Some(ProviderSelector::Field("model_provider")),
        projection: Box::new(CodexProviderSections),
        credentials: extract::codex,
        credential_writer: Some(write::codex),
        model_field: Some("model"),
        mcp: McpLayout::CommandArgs("mcp_servers"),
    }
}
