use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::DiscoveryError;
use crate::settings::NetworkSettings;

use super::{parse_model_list, ApiDialect, ModelDiscovery};

const MAX_ERROR_BODY: usize = 200;

/// [`ModelDiscovery`] over HTTP, honouring the configured proxy and timeout.
#[derive(Debug, Clone)]
pub struct HttpModelDiscovery {
    client: Client,
}

impl HttpModelDiscovery {
    pub fn new(settings: &NetworkSettings) -> Result<Self, DiscoveryError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(settings.timeout_seconds));
        if let Some(proxy_url) = settings.proxy_url() {
            log::info!("routing model discovery through proxy {proxy_url}");
            let proxy = reqwest::Proxy::all(&proxy_url).map_err(|err| {
                DiscoveryError::transport(format!("invalid proxy `{proxy_url}`: {err}"))
            })?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ModelDiscovery for HttpModelDiscovery {
    async fn fetch_models(
        &self,
        endpoint: &str,
        api_key: &SecretString,
        dialect: ApiDialect,
    ) -> Result<Vec<String>, DiscoveryError> {
        let url = dialect.models_url(endpoint);
        log::debug!("listing {dialect} models from {url}");

        let mut request = self.client.get(&url);
        for (name, value) in dialect.auth_headers(api_key.expose_secret()) {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|err| DiscoveryError::transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| DiscoveryError::transport(err.to_string()))?;

        if !status.is_success() {
            log::warn!("model listing at {url} returned {status}");
            return Err(DiscoveryError::http(status.as_u16(), error_message(status, &body)));
        }

        let models = parse_model_list(&body)?;
        log::debug!("{url} offered {} models", models.len());
        Ok(models)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Nested { error: ErrorDetail },
    Flat { error: String },
    Message { message: String },
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Nested { error }) => error.message,
        Ok(ErrorBody::Flat { error }) => error,
        Ok(ErrorBody::Message { message }) => message,
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        Err(_) => body.trim().chars().take(MAX_ERROR_BODY).collect(),
    }
}
