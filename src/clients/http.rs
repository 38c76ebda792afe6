//! HTTP client for the analysis services
//!
//! Talks to the JSON endpoints of the face-analysis web service:
//! - `POST /analyze-emotion-realtime` - `{image}` → emotion distribution
//! - `POST /generate-practice-report` - history → rendered chart location
//! - `POST /analyze-similarity` - multipart photo → look-alike matches

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::messages::{
    ChartRequest, ChartResponse, ClassifyRequest, ClassifyResponse, Classification, ErrorBody,
    SimilarityResponse,
};
use super::service::{
    unwrap_envelope, ChartReference, ClassificationClient, ClientsConfig, ReportClient,
    SimilarityClient, SimilarityResult,
};
use crate::capture::EncodedFrame;
use crate::error::ClientError;
use crate::session::Sample;

const USER_AGENT: &str = "practice-coach/0.1.0";

pub struct HttpServiceClient {
    http: reqwest::Client,
    base_url: String,
    classify_path: String,
    chart_path: String,
    similarity_path: String,
    timeout_secs: u64,
}

impl HttpServiceClient {
    pub fn new(config: &ClientsConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            classify_path: config.classify_path.clone(),
            chart_path: config.chart_path.clone(),
            similarity_path: config.similarity_path.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.read_json(response).await
    }

    async fn read_json<R: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<R, ClientError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<ErrorBody>(&body) {
                warn!("Service returned {}: {}", status, err.error);
                return Err(ClientError::Api(status.as_u16(), err.error));
            }
            return Err(ClientError::Api(status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))
    }

    fn map_send_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout(self.timeout_secs)
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

#[async_trait::async_trait]
impl ClassificationClient for HttpServiceClient {
    async fn classify(&self, frame: &EncodedFrame) -> Result<Classification, ClientError> {
        let request = ClassifyRequest {
            image: frame.data_url.clone(),
            session_id: None,
        };

        let reply: ClassifyResponse = self.post_json(&self.classify_path, &request).await?;
        unwrap_envelope(reply.success, reply.emotion, reply.error, "classification")
    }
}

#[async_trait::async_trait]
impl ReportClient for HttpServiceClient {
    async fn render_chart(&self, history: &[Sample]) -> Result<ChartReference, ClientError> {
        if history.is_empty() {
            return Err(ClientError::InsufficientData(0));
        }

        let request = ChartRequest::from_history(history);
        let reply: ChartResponse = self.post_json(&self.chart_path, &request).await?;

        unwrap_envelope(reply.success, reply.report_image, reply.error, "chart").map(ChartReference)
    }
}

#[async_trait::async_trait]
impl SimilarityClient for HttpServiceClient {
    async fn analyze(&self, image: &EncodedFrame) -> Result<SimilarityResult, ClientError> {
        let bytes = image
            .jpeg_bytes()
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        let part = Part::bytes(bytes)
            .file_name("capture.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let form = Form::new().part("image", part);

        let url = self.url(&self.similarity_path);
        debug!("POST {} (multipart)", url);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let reply: SimilarityResponse = self.read_json(response).await?;
        let personality =
            unwrap_envelope(reply.success, reply.personality, reply.error, "similarity")?;

        Ok(SimilarityResult {
            personality,
            similar_animals: reply.similar_animals,
            result_title: reply.result_title,
        })
    }
}
