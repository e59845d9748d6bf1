use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::Endpoints;

const STATUS_OK: u16 = 200;

/// Status and body of a completed HTTP exchange. `body` is only read for 200 OK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Minimal GET client the fetcher depends on.
/// An `Err` means no response was received at all (DNS, connect, timeout, ...).
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// `HttpClient` backed by reqwest
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let status = response.status().as_u16();
        if status != STATUS_OK {
            return Ok(HttpResponse {
                status,
                body: Vec::new(),
            });
        }

        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Primary,
    Secondary,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Primary => write!(f, "primary"),
            Tier::Secondary => write!(f, "secondary"),
        }
    }
}

/// Successful response body, tagged with the endpoint that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBody {
    pub endpoint: String,
    pub tier: Tier,
    pub body: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("endpoint {endpoint} is unavailable, status {status}")]
    EndpointUnavailable { endpoint: String, status: u16 },
    #[error("request to {endpoint} failed: {source:#}")]
    Transport {
        endpoint: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Fetches an image-search payload, falling back to the secondary endpoint
/// once when the primary does not answer with 200 OK.
pub struct Fetcher {
    client: Arc<dyn HttpClient>,
    endpoints: Endpoints,
}

impl Fetcher {
    pub fn new(client: Arc<dyn HttpClient>, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    pub async fn fetch(&self) -> Result<FetchedBody, FetchError> {
        match self.attempt(Tier::Primary).await {
            Ok(fetched) => return Ok(fetched),
            Err(e) => {
                error!("Primary image API failed: {}", e);
                debug!("Falling back to {}", self.endpoints.secondary);
            }
        }

        self.attempt(Tier::Secondary).await.inspect_err(|e| {
            error!("Secondary image API failed: {}", e);
        })
    }

    async fn attempt(&self, tier: Tier) -> Result<FetchedBody, FetchError> {
        let endpoint = match tier {
            Tier::Primary => &self.endpoints.primary,
            Tier::Secondary => &self.endpoints.secondary,
        };

        let response = self
            .client
            .get(endpoint)
            .await
            .map_err(|source| FetchError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        if response.status != STATUS_OK {
            return Err(FetchError::EndpointUnavailable {
                endpoint: endpoint.clone(),
                status: response.status,
            });
        }

        info!("Request to {} image API succeeded", tier);
        Ok(FetchedBody {
            endpoint: endpoint.clone(),
            tier,
            body: response.body,
        })
    }
}
