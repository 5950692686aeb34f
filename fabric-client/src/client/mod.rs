//! HTTP client for the Fabric API
//!
//! This module implements the unary request path: client construction,
//! URL building, authentication headers, status handling, and the JSON
//! request/response helpers that the entity and catalog operations are
//! built on. The streaming chat path lives in [`crate::stream`].

pub mod entities;

use crate::error::{Error, Result};
use crate::protocol::types::{AvailableModels, ServiceConfig, Strategy};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

/// Header carrying the API key
const API_KEY_HEADER: &str = "X-API-Key";

/// Header carrying the per-request correlation id
const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Default timeout for unary requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent
const USER_AGENT: &str = concat!("fabric-client/", env!("CARGO_PKG_VERSION"));

/// Environment variable naming the Fabric server URL
const SERVER_URL_ENV: &str = "FABRIC_SERVER_URL";

/// Environment variable naming the API key
const API_KEY_ENV: &str = "FABRIC_API_KEY";

/// A client for one Fabric server.
///
/// Cloning is cheap; clones share the underlying connection pool. Each chat
/// stream started from a client owns its connection exclusively, so multiple
/// concurrent chats from the same client run fully independently.
#[derive(Clone)]
pub struct Client {
    base_url: Url,
    api_key: Option<String>,
    timeout: Duration,
    http: reqwest::Client,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The API key is a credential; never include it in debug output.
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for [`Client`] instances.
pub struct ClientBuilder {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            http: None,
        }
    }

    /// Set the API key sent in the `X-API-Key` header.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the timeout applied to unary requests.
    ///
    /// Chat streams are exempt: only the connect timeout applies to them, so
    /// long generations are not cut off mid-stream.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a pre-configured `reqwest::Client` instead of the default one.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Validate the configuration and build the client.
    pub fn build(self) -> Result<Client> {
        let base_url = Url::parse(&self.base_url).map_err(|e| Error::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl {
                url: self.base_url,
                reason: "URL cannot serve as a request base".to_string(),
            });
        }

        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .user_agent(USER_AGENT)
                .build()
                .map_err(Error::HttpClient)?,
        };

        Ok(Client {
            base_url,
            api_key: self.api_key,
            timeout: self.timeout,
            http,
        })
    }
}

impl Client {
    /// Create a client for the server at `base_url` with default settings.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder(base_url).build()
    }

    /// Start building a client for the server at `base_url`.
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    /// Create a client from the `FABRIC_SERVER_URL` and optional
    /// `FABRIC_API_KEY` environment variables.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(SERVER_URL_ENV).map_err(|_| Error::MissingEnv {
            name: SERVER_URL_ENV,
        })?;

        let mut builder = Self::builder(base_url);
        if let Ok(api_key) = std::env::var(API_KEY_ENV) {
            if !api_key.is_empty() {
                builder = builder.api_key(api_key);
            }
        }

        builder.build()
    }

    /// Build the request URL for the given path segments.
    ///
    /// Segments are appended one by one so entity names are percent-encoded
    /// rather than interpreted as path structure.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Infallible: build() rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a unary request with the default timeout.
    pub(crate) async fn execute(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        self.execute_with_timeout(method, segments, body, Some(self.timeout))
            .await
    }

    /// Send a request, optionally without a total-request timeout.
    ///
    /// Returns the response only for success statuses; any other status is
    /// mapped to [`Error::Status`] with the body captured for diagnostics.
    pub(crate) async fn execute_with_timeout(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Vec<u8>>,
        timeout: Option<Duration>,
    ) -> Result<Response> {
        let url = self.endpoint(segments);
        let request_id = Uuid::new_v4();

        debug!(%method, %url, %request_id, "sending request");

        let mut request = self
            .http
            .request(method, url.clone())
            .header(REQUEST_ID_HEADER, request_id.to_string());

        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        if let Some(api_key) = &self.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }

        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await.map_err(|source| {
            warn!(%url, %request_id, "request failed: {source}");
            Error::Request {
                url: url.to_string(),
                source,
            }
        })?;

        let status = response.status();
        debug!(%status, %url, %request_id, "received response");

        if !status.is_success() {
            let body = response.text().await.ok().filter(|body| !body.is_empty());
            warn!(status = status.as_u16(), %url, %request_id, "request rejected");
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// GET the given path and decode its JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        what: &'static str,
    ) -> Result<T> {
        let response = self.execute(Method::GET, segments, None).await?;
        let url = response.url().to_string();
        let text = response
            .text()
            .await
            .map_err(|source| Error::Request { url, source })?;

        serde_json::from_str(&text).map_err(|source| Error::Decode { what, source })
    }

    /// Retrieve the server's provider configuration.
    pub async fn get_config(&self) -> Result<ServiceConfig> {
        self.get_json(&["config"], "config").await
    }

    /// Update the server's provider configuration.
    pub async fn update_config(&self, config: &ServiceConfig) -> Result<()> {
        let body = serde_json::to_vec(config).map_err(|source| Error::Encode {
            what: "config",
            source,
        })?;
        self.execute(Method::PUT, &["config", "update"], Some(body))
            .await?;
        Ok(())
    }

    /// List the models available on the server, grouped by vendor.
    pub async fn list_models(&self) -> Result<AvailableModels> {
        self.get_json(&["models", "names"], "model list").await
    }

    /// List the strategies available on the server.
    pub async fn list_strategies(&self) -> Result<Vec<Strategy>> {
        self.get_json(&["strategies"], "strategy list").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_invalid_url() {
        assert!(matches!(
            Client::new("not a url"),
            Err(Error::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn builder_rejects_cannot_be_a_base_url() {
        assert!(matches!(
            Client::new("mailto:someone@example.com"),
            Err(Error::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn endpoint_joins_and_encodes_segments() {
        let client = Client::new("http://localhost:8080").unwrap();
        let url = client.endpoint(&["patterns", "my pattern"]);
        assert_eq!(url.as_str(), "http://localhost:8080/patterns/my%20pattern");
    }

    #[test]
    fn endpoint_respects_base_path() {
        let client = Client::new("http://localhost:8080/fabric/").unwrap();
        let url = client.endpoint(&["contexts", "names"]);
        assert_eq!(url.as_str(), "http://localhost:8080/fabric/contexts/names");
    }
}
