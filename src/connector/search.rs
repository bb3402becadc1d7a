//! Elasticsearch-compatible search cluster backend over HTTP.
//!
//! The handle is a configured `reqwest` client plus the cluster addresses.
//! When `ping` is enabled, connecting issues `GET /` against the first
//! address and checks that the reported major version matches the tag the
//! connector is registered under (`esv6` or `esv7`).

use crate::factory::{BackendHandle, DbFactory, FactoryError};
use crate::registry::{BackendType, Connector, ConnectorError, ESV6_TAG, ESV7_TAG};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Settings for an `esv6`/`esv7` shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Node URLs, e.g. `["http://127.0.0.1:9200"]`.
    pub address: Vec<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Ask for gzip-compressed responses.
    pub gzip: bool,
    /// Probe the cluster while connecting.
    pub ping: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            address: Vec::new(),
            username: None,
            password: None,
            timeout_ms: 5000,
            gzip: false,
            ping: true,
        }
    }
}

/// Client for one search cluster.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: Client,
    addresses: Vec<Url>,
    major_version: u8,
    username: Option<String>,
    password: Option<String>,
}

impl SearchClient {
    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn addresses(&self) -> &[Url] {
        &self.addresses
    }

    /// Major version this client was configured for (6 or 7).
    pub fn major_version(&self) -> u8 {
        self.major_version
    }

    /// Start a request against the first node, with credentials applied.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let base = self.addresses[0].as_str().trim_end_matches('/');
        let url = format!("{}/{}", base, path.trim_start_matches('/'));
        let builder = self.http.request(method, url);

        match &self.username {
            Some(username) => builder.basic_auth(username, self.password.as_deref()),
            None => builder,
        }
    }
}

impl BackendHandle for SearchClient {
    const BACKEND_TYPES: &'static [&'static str] = &[ESV6_TAG, ESV7_TAG];
}

/// Root endpoint response (`GET /`)
#[derive(Deserialize)]
struct RootResponse {
    version: VersionInfo,
}

#[derive(Deserialize)]
struct VersionInfo {
    number: String,
}

/// Connector for [`BackendType::ESV6`] and [`BackendType::ESV7`].
pub struct SearchConnector {
    major_version: u8,
}

impl SearchConnector {
    pub fn new(major_version: u8) -> Self {
        Self { major_version }
    }

    pub fn v6() -> Self {
        Self::new(6)
    }

    pub fn v7() -> Self {
        Self::new(7)
    }

    async fn ping(&self, client: &SearchClient) -> Result<(), ConnectorError> {
        let response = client
            .request(Method::GET, "/")
            .send()
            .await
            .map_err(|e| ConnectorError::Ping(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ConnectorError::Ping(format!(
                "{} returned {}",
                client.addresses[0],
                response.status()
            )));
        }

        let root: RootResponse = response
            .json()
            .await
            .map_err(|e| ConnectorError::Ping(format!("unexpected root response: {}", e)))?;

        let major = root
            .version
            .number
            .split('.')
            .next()
            .and_then(|major| major.parse::<u8>().ok());

        if major != Some(self.major_version) {
            return Err(ConnectorError::VersionMismatch {
                expected: self.major_version,
                actual: root.version.number,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Connector for SearchConnector {
    type Config = SearchConfig;
    type Handle = SearchClient;

    fn describe(&self) -> &'static str {
        match self.major_version {
            6 => "Elasticsearch 6.x cluster (HTTP)",
            7 => "Elasticsearch 7.x cluster (HTTP)",
            _ => "Elasticsearch-compatible cluster (HTTP)",
        }
    }

    async fn connect(&self, config: &SearchConfig) -> Result<SearchClient, ConnectorError> {
        if config.address.is_empty() {
            return Err(ConnectorError::InvalidConfig(
                "at least one address is required".to_string(),
            ));
        }

        let addresses = config
            .address
            .iter()
            .map(|address| {
                Url::parse(address).map_err(|e| {
                    ConnectorError::InvalidConfig(format!("invalid address '{}': {}", address, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .gzip(config.gzip)
            .build()
            .map_err(|e| ConnectorError::Connect(e.to_string()))?;

        let client = SearchClient {
            http,
            addresses,
            major_version: self.major_version,
            username: config.username.clone().filter(|u| !u.is_empty()),
            password: config.password.clone(),
        };

        if config.ping {
            self.ping(&client).await?;
        }

        tracing::debug!(
            nodes = client.addresses.len(),
            major_version = self.major_version,
            "Search cluster client ready"
        );

        Ok(client)
    }

    async fn close(&self, _handle: &SearchClient) -> Result<(), ConnectorError> {
        // Pooled HTTP connections are released when the last clone drops.
        Ok(())
    }
}

/// Add a search cluster config under `name` for the given tag (`esv6` or `esv7`).
pub async fn add_config(
    factory: &DbFactory,
    name: &str,
    backend_type: BackendType,
    config: SearchConfig,
) -> Result<(), FactoryError> {
    factory
        .add_typed_config::<SearchConnector>(name, backend_type, config)
        .await
}

/// Fetch the search client connected under `name`.
pub async fn get(factory: &DbFactory, name: &str) -> Result<Arc<SearchClient>, FactoryError> {
    factory.get::<SearchClient>(name).await
}

/// Fetch the search client connected under `name`, panicking on any error.
///
/// Only for startup wiring.
pub async fn must_get(factory: &DbFactory, name: &str) -> Arc<SearchClient> {
    factory.must_get::<SearchClient>(name).await
}
