use super::types::{PredictRequest, PredictResponse};
use crate::config::InferenceConfig;
use crate::error::InferenceError;
use async_trait::async_trait;
use tracing::{debug, info};

/// Remote classifier that labels a captured frame
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Send one encoded frame and return the label the server assigned
    async fn predict(&self, image_data_uri: &str) -> Result<String, InferenceError>;
}

/// JSON-over-HTTP client for the `/predict` endpoint
pub struct HttpInferenceClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpInferenceClient {
    pub fn new(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| InferenceError::Client {
            details: e.to_string(),
        })?;

        info!("Inference endpoint: {}", config.endpoint);

        Ok(Self {
            client,
            endpoint: config.endpoint.trim().to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn predict(&self, image_data_uri: &str) -> Result<String, InferenceError> {
        debug!(
            "POST {} ({} byte payload)",
            self.endpoint,
            image_data_uri.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&PredictRequest {
                image: image_data_uri,
            })
            .send()
            .await
            .map_err(|source| InferenceError::Transport {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(InferenceError::Status {
                code: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| InferenceError::Transport {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let parsed: PredictResponse =
            serde_json::from_slice(&body).map_err(|e| InferenceError::Decode {
                details: e.to_string(),
            })?;

        debug!("Inference result: {}", parsed.result);
        Ok(parsed.result)
    }
}
