use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    pub network: NetworkSettings,
    pub paths: PathSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyKind {
    #[default]
    None,
    Http,
    Socks5,
}

impl ProxyKind {
    fn scheme(&self) -> Option<&'static str> {
        match self {
            ProxyKind::None => None,
            ProxyKind::Http => Some("http"),
            ProxyKind::Socks5 => Some("socks5"),
        }
    }
}

/// Outbound HTTP settings for model discovery.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub proxy_type: ProxyKind,
    pub proxy_address: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            proxy_type: ProxyKind::None,
            proxy_address: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl NetworkSettings {
    /// Full proxy URL, adding the scheme implied by `proxy_type` when the address has none.
    pub fn proxy_url(&self) -> Option<String> {
        let scheme = self.proxy_type.scheme()?;
        let address = self
            .proxy_address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())?;
        if address.contains("://") {
            Some(address.to_string())
        } else {
            Some(format!("{scheme}://{address}"))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PathSettings {
    /// Directory used in place of the user's home when expanding `~`
    pub home_override: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ProxyKind::None, Some("127.0.0.1:7890"), None)]
    #[case(ProxyKind::Http, None, None)]
    #[case(ProxyKind::Http, Some("  "), None)]
    #[case(ProxyKind::Http, Some("127.0.0.1:7890"), Some("http://127.0.0.1:7890"))]
    #[case(ProxyKind::Socks5, Some("127.0.0.1:1080"), Some("socks5://127.0.0.1:1080"))]
    #[case(ProxyKind::Socks5, Some("socks5h://proxy:1080"), Some("socks5h://proxy:1080"))]
    fn proxy_url_adds_missing_scheme(
        #[case] proxy_type: ProxyKind,
        #[case] address: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let settings = NetworkSettings {
            proxy_type,
            proxy_address: address.map(str::to_string),
            ..NetworkSettings::default()
        };
        assert_eq!(settings.proxy_url().as_deref(), expected);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let settings: EngineSettings =
            toml::from_str("[network]\nproxy_type = \"http\"\n").unwrap();
        assert_eq!(settings.network.proxy_type, ProxyKind::Http);
        assert_eq!(settings.network.timeout_seconds, 30);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.paths.home_override, None);
    }
}
