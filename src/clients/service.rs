use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

use super::http::HttpServiceClient;
use super::messages::{Classification, Personality, SimilarAnimal};
use super::nats::NatsServiceClient;
use crate::capture::EncodedFrame;
use crate::error::ClientError;
use crate::session::Sample;

/// Opaque handle to a rendered chart, passed through to the report verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartReference(pub String);

impl fmt::Display for ChartReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Look-alike analysis of a single photo
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityResult {
    pub personality: Personality,
    pub similar_animals: Vec<SimilarAnimal>,
    pub result_title: Option<String>,
}

/// Emotion classification of one frame
#[async_trait::async_trait]
pub trait ClassificationClient: Send + Sync {
    async fn classify(&self, frame: &EncodedFrame) -> Result<Classification, ClientError>;
}

/// Chart rendering for a finished session
#[async_trait::async_trait]
pub trait ReportClient: Send + Sync {
    /// Render the history; `history` is ordered by capture time
    async fn render_chart(&self, history: &[Sample]) -> Result<ChartReference, ClientError>;
}

/// Stateless single-shot look-alike analysis
#[async_trait::async_trait]
pub trait SimilarityClient: Send + Sync {
    async fn analyze(&self, image: &EncodedFrame) -> Result<SimilarityResult, ClientError>;
}

/// Wire transport for classification and chart rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    Http,
    Nats,
}

/// External service endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientsConfig {
    pub transport: Transport,

    /// Base URL of the analysis HTTP service
    pub base_url: String,
    pub classify_path: String,
    pub chart_path: String,
    pub similarity_path: String,

    /// NATS server URL
    pub nats_url: String,
    pub classify_subject: String,
    pub chart_subject: String,

    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ClientsConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Http,
            base_url: "http://localhost:5000".to_string(),
            classify_path: "/analyze-emotion-realtime".to_string(),
            chart_path: "/generate-practice-report".to_string(),
            similarity_path: "/analyze-similarity".to_string(),
            nats_url: "nats://localhost:4222".to_string(),
            classify_subject: "practice.emotion.classify".to_string(),
            chart_subject: "practice.report.chart".to_string(),
            timeout_secs: 30,
        }
    }
}

/// The three collaborators, ready to hand to the controller and adapter
#[derive(Clone)]
pub struct ServiceClients {
    pub classifier: Arc<dyn ClassificationClient>,
    pub reporter: Arc<dyn ReportClient>,
    pub similarity: Arc<dyn SimilarityClient>,
}

/// Service client factory
pub struct ClientFactory;

impl ClientFactory {
    /// Build clients for the configured transport.
    ///
    /// Similarity always goes over HTTP since it uploads a multipart image.
    pub async fn connect(config: &ClientsConfig) -> Result<ServiceClients> {
        let http = Arc::new(
            HttpServiceClient::new(config).context("Failed to build HTTP service client")?,
        );

        match config.transport {
            Transport::Http => {
                info!("Analysis services over HTTP at {}", config.base_url);
                Ok(ServiceClients {
                    classifier: http.clone(),
                    reporter: http.clone(),
                    similarity: http,
                })
            }

            Transport::Nats => {
                let nats = Arc::new(
                    NatsServiceClient::connect(config)
                        .await
                        .context("Failed to connect to NATS")?,
                );
                info!("Analysis services over NATS at {}", config.nats_url);
                Ok(ServiceClients {
                    classifier: nats.clone(),
                    reporter: nats,
                    similarity: http,
                })
            }
        }
    }
}

/// Unwrap a `{success, <payload>, error}` reply envelope
pub(crate) fn unwrap_envelope<T>(
    success: bool,
    payload: Option<T>,
    error: Option<String>,
    what: &str,
) -> Result<T, ClientError> {
    if let Some(error) = error {
        return Err(ClientError::Rejected(error));
    }

    match payload {
        Some(payload) if success => Ok(payload),
        Some(_) => Err(ClientError::Rejected(format!("{} reply not marked successful", what))),
        None => Err(ClientError::Parse(format!("{} reply missing payload", what))),
    }
}
