use anyhow::{Context, Result};
use async_nats::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use super::messages::{
    ChartRequest, ChartResponse, ClassifyRequest, ClassifyResponse, Classification,
};
use super::service::{
    unwrap_envelope, ChartReference, ClassificationClient, ClientsConfig, ReportClient,
};
use crate::capture::EncodedFrame;
use crate::error::ClientError;
use crate::session::Sample;

/// Request/reply client for analysis workers listening on NATS
pub struct NatsServiceClient {
    client: Client,
    classify_subject: String,
    chart_subject: String,
    timeout_secs: u64,
}

impl NatsServiceClient {
    /// Connect to NATS server
    pub async fn connect(config: &ClientsConfig) -> Result<Self> {
        info!("Connecting to NATS at {}", config.nats_url);

        let client = async_nats::connect(config.nats_url.as_str())
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self {
            client,
            classify_subject: config.classify_subject.clone(),
            chart_subject: config.chart_subject.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    async fn request<B, R>(&self, subject: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body).map_err(|e| ClientError::Parse(e.to_string()))?;
        let bytes = payload.len();

        let reply = tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            self.client.request(subject.to_string(), payload.into()),
        )
        .await
        .map_err(|_| ClientError::Timeout(self.timeout_secs))?
        .map_err(|e| ClientError::Network(e.to_string()))?;

        debug!(
            "Request on {} ({} bytes) answered with {} bytes",
            subject,
            bytes,
            reply.payload.len()
        );

        serde_json::from_slice(&reply.payload).map_err(|e| ClientError::Parse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ClassificationClient for NatsServiceClient {
    async fn classify(&self, frame: &EncodedFrame) -> Result<Classification, ClientError> {
        let request = ClassifyRequest {
            image: frame.data_url.clone(),
            session_id: None,
        };

        let reply: ClassifyResponse = self.request(&self.classify_subject, &request).await?;
        unwrap_envelope(reply.success, reply.emotion, reply.error, "classification")
    }
}

#[async_trait::async_trait]
impl ReportClient for NatsServiceClient {
    async fn render_chart(&self, history: &[Sample]) -> Result<ChartReference, ClientError> {
        if history.is_empty() {
            return Err(ClientError::InsufficientData(0));
        }

        let request = ChartRequest::from_history(history);
        let reply: ChartResponse = self.request(&self.chart_subject, &request).await?;

        unwrap_envelope(reply.success, reply.report_image, reply.error, "chart").map(ChartReference)
    }
}
