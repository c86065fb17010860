//! HAL client facade.

use crate::config::ClientConfig;
use crate::link::Method;
use crate::resource::HalValue;
use crate::transformer::HalTransformer;
use crate::transport::{HttpTransport, Transport, TransportError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Entry point for navigating a HAL API.
///
/// Fetches root documents through its transport and walks relation paths
/// over the transformed graph.
pub struct HalClient {
    /// Configuration
    config: ClientConfig,
    /// Transformer shared by every resource this client produces
    transformer: HalTransformer,
    /// Root documents fetched
    fetches_total: AtomicU64,
    /// Relations followed
    follows_total: AtomicU64,
}

impl HalClient {
    /// Create a client that talks HTTP as configured.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(&config.transport)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client on top of an existing transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        info!(
            transport = transport.name(),
            base_url = ?config.transport.base_url,
            "HAL client initialized"
        );

        Self {
            config,
            transformer: HalTransformer::new(transport),
            fetches_total: AtomicU64::new(0),
            follows_total: AtomicU64::new(0),
        }
    }

    /// Create from a YAML configuration string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ClientError> {
        let config: ClientConfig = serde_yaml::from_str(yaml)?;
        Self::new(config)
    }

    /// Create from a JSON configuration string.
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        let config: ClientConfig = serde_json::from_str(json)?;
        Self::new(config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transformer(&self) -> &HalTransformer {
        &self.transformer
    }

    /// GET `href` and transform the response.
    pub async fn fetch(&self, href: &str) -> Result<HalValue, ClientError> {
        self.fetches_total.fetch_add(1, Ordering::Relaxed);

        let body = self
            .transformer
            .transport()
            .request(&Method::Get, href)
            .await?;
        let value = self.transformer.transform(body);

        info!(href, transformed = value.is_transformed(), "Fetched document");
        Ok(value)
    }

    /// Walk `relations` starting at `start`.
    ///
    /// A relation whose property already holds a transformed resource (or a
    /// list of them) is used as is; otherwise its link is retrieved with GET.
    /// A relation without a link resolves to whatever value the property holds.
    pub async fn follow(&self, start: HalValue, relations: &[String]) -> Result<HalValue, ClientError> {
        let mut current = start;

        for relation in relations {
            self.follows_total.fetch_add(1, Ordering::Relaxed);

            let resource = current
                .as_resource()
                .cloned()
                .ok_or_else(|| ClientError::NotAResource(relation.clone()))?;

            let present = resource.get(relation);
            let expanded = present
                .as_ref()
                .is_some_and(|v| v.is_transformed() || v.as_list().is_some());

            current = match (present, resource.link(relation)) {
                (Some(value), _) if expanded => {
                    debug!(relation = %relation, "Following embedded relation");
                    value
                }
                (_, Some(link)) => link.list().await?,
                (Some(value), None) => {
                    debug!(relation = %relation, "Relation has no link, using present value");
                    value
                }
                (None, None) => return Err(ClientError::UnknownRelation(relation.clone())),
            };
        }

        Ok(current)
    }

    /// Number of root documents fetched.
    pub fn fetches_total(&self) -> u64 {
        self.fetches_total.load(Ordering::Relaxed)
    }

    /// Number of relations followed.
    pub fn follows_total(&self) -> u64 {
        self.follows_total.load(Ordering::Relaxed)
    }
}

/// HAL client errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Unknown relation: {0}")]
    UnknownRelation(String),

    #[error("Cannot follow '{0}' from a value that is not a resource")]
    NotAResource(String),
}
