use super::{ApiResponse, Transport};
use crate::config::SyncConfig;
use crate::error::{ConfigError, Result, SyncError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder};
use tracing::debug;

/// Header carrying the control plane credential (`X-API-Key`)
pub const API_KEY_HEADER: &str = "x-api-key";

/// `Transport` over HTTP(S) with reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a client that sends the API key on every request and gives up
    /// after the configured request timeout
    pub fn new(config: &SyncConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey.into());
        }

        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| ConfigError::ParseError("API key is not a valid header value".into()))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .user_agent(concat!("zonesync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, method: Method, url: &str) -> Result<ApiResponse> {
        let response = request
            .send()
            .await
            .map_err(|e| SyncError::Transport(format!("{} {} failed: {}", method, url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Transport(format!("{} {} body read failed: {}", method, url, e)))?;

        debug!("{} {} -> {}", method, url, status);
        Ok(ApiResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<ApiResponse> {
        let url = self.url(path);
        self.send(self.client.get(&url), Method::GET, &url).await
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> Result<ApiResponse> {
        let url = self.url(path);
        self.send(self.client.post(&url).json(body), Method::POST, &url)
            .await
    }

    async fn patch(&self, path: &str, body: &serde_json::Value) -> Result<ApiResponse> {
        let url = self.url(path);
        self.send(self.client.patch(&url).json(body), Method::PATCH, &url)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_rejected() {
        let err = HttpTransport::new(&SyncConfig::default()).unwrap_err();
        assert!(matches!(err, SyncError::Config(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let config = SyncConfig {
            api_url: "http://pdns:8081/api/v1/".to_string(),
            api_key: "key".to_string(),
            ..Default::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(
            transport.url("/servers/localhost/zones"),
            "http://pdns:8081/api/v1/servers/localhost/zones"
        );
    }
}
