//! Configuration and logging API

use crate::client::{HttpClientConfig, create_client};
use crate::{ClientError, Result};
use aiswitch_core::log::{LogEntry, LogId, LogPage, LogQuery};
use aiswitch_core::mutation::{Mutation, MutationAck};
use aiswitch_core::provider::{BackendConfig, Provider};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

/// Default API root of a locally running backend
pub const DEFAULT_BASE_URL: &str = "http://localhost:3400/api/";

/// Everything the console reads from or sends to the backend
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    async fn providers(&self) -> Result<Vec<Provider>>;

    /// Id of the globally active provider, if any
    async fn active_provider(&self) -> Result<Option<String>>;

    /// Full backend configuration
    async fn config(&self) -> Result<BackendConfig>;

    async fn logs(&self, query: &LogQuery) -> Result<LogPage>;

    /// A single log entry; `None` when the backend has no such id
    async fn log(&self, id: &LogId) -> Result<Option<LogEntry>>;

    /// Send a mutation. Rejections acknowledged with 200 become
    /// `ClientError::Rejected`.
    async fn apply(&self, mutation: &Mutation) -> Result<MutationAck>;
}

/// API connection settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API root, e.g. `http://localhost:3400/api/`
    pub base_url: String,

    /// HTTP client configuration
    pub client_config: HttpClientConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client_config: HttpClientConfig::default(),
        }
    }

    /// Set the HTTP client configuration
    pub fn with_client_config(mut self, client_config: HttpClientConfig) -> Self {
        self.client_config = client_config;
        self
    }
}

/// `ConsoleApi` over HTTP
pub struct HttpConsoleApi {
    base_url: Url,
    client: Client,
}

impl HttpConsoleApi {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;
        let client = create_client(&config.client_config)?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join percent-encoded path segments onto the base URL
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!("{} {}", method, url);
        Ok(self.client.request(method, url))
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let response = self.request(Method::GET, segments)?.send().await?;
        read_json(check_status(response).await?).await
    }

    async fn send_mutation(&self, request: RequestBuilder) -> Result<MutationAck> {
        let response = check_status(request.send().await?).await?;

        // Some endpoints answer with an empty body
        let body = response.text().await?;
        let ack = if body.trim().is_empty() {
            MutationAck::default()
        } else {
            serde_json::from_str::<MutationAck>(&body)
                .map_err(|e| ClientError::Parse(format!("{}: {}", e, body)))?
        };

        if ack.is_success() {
            Ok(ack)
        } else {
            Err(ClientError::Rejected(ack.message))
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidUrl(raw.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    debug!("Response status: {}", status);
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error body".to_string());
    Err(ClientError::Status {
        status_code: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ClientError::Parse(e.to_string()))
}

#[async_trait]
impl ConsoleApi for HttpConsoleApi {
    #[instrument(skip(self))]
    async fn providers(&self) -> Result<Vec<Provider>> {
        self.get_json(&["config", "providers"]).await
    }

    #[instrument(skip(self))]
    async fn active_provider(&self) -> Result<Option<String>> {
        let active: Option<String> = self.get_json(&["config", "active-provider"]).await?;
        Ok(active.filter(|id| !id.is_empty()))
    }

    #[instrument(skip(self))]
    async fn config(&self) -> Result<BackendConfig> {
        self.get_json(&["config"]).await
    }

    #[instrument(skip(self))]
    async fn logs(&self, query: &LogQuery) -> Result<LogPage> {
        let mut url = self.endpoint(&["logs"])?;
        url.query_pairs_mut().extend_pairs(query.to_params());
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        read_json(check_status(response).await?).await
    }

    #[instrument(skip(self), fields(log_id = %id))]
    async fn log(&self, id: &LogId) -> Result<Option<LogEntry>> {
        let response = self.request(Method::GET, &["logs", id.as_str()])?.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("Log entry not found");
            return Ok(None);
        }
        read_json(check_status(response).await?).await.map(Some)
    }

    #[instrument(skip(self, mutation), fields(kind = mutation.kind()))]
    async fn apply(&self, mutation: &Mutation) -> Result<MutationAck> {
        let request = match mutation {
            Mutation::AddProvider { id, provider } => self
                .request(Method::POST, &["config", "providers", id.as_str()])?
                .json(provider),
            Mutation::UpdateProvider { id, patch } => self
                .request(Method::PUT, &["config", "providers", id.as_str()])?
                .json(patch),
            Mutation::DeleteProvider { id } => {
                self.request(Method::DELETE, &["config", "providers", id.as_str()])?
            }
            Mutation::SetActiveProvider(action) => self
                .request(Method::POST, &["config", "active-provider"])?
                .body(action.body()),
            Mutation::AddPreset {
                provider_id,
                preset,
            } => self
                .request(Method::POST, &["config", "providers", provider_id.as_str(), "presets"])?
                .json(preset),
            Mutation::UpdatePreset {
                provider_id,
                preset_id,
                preset,
            } => self
                .request(
                    Method::PUT,
                    &[
                        "config",
                        "providers",
                        provider_id.as_str(),
                        "presets",
                        preset_id.as_str(),
                    ],
                )?
                .json(preset),
            Mutation::SetActivePreset {
                provider_id,
                preset_id,
            } => self
                .request(
                    Method::POST,
                    &["config", "providers", provider_id.as_str(), "active-preset"],
                )?
                .body(preset_id.clone().unwrap_or_default()),
        };

        match self.send_mutation(request).await {
            Ok(ack) => {
                info!("Applied {}: {}", mutation, ack.message);
                Ok(ack)
            }
            Err(ClientError::Rejected(message)) => {
                warn!("Backend rejected {}: {}", mutation, message);
                Err(ClientError::Rejected(message))
            }
            Err(e) => Err(e),
        }
    }
}
