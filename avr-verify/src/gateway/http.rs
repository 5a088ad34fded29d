//! HTTP Verification Gateway
//!
//! Endpoints (relative to the configured base URL):
//! - `GET  /annotationCollections`
//! - `GET  /videoCollections`
//! - `GET  /annotations/byCollections?collections=..&excludeTracking=..&trackingFirst=..`
//! - `POST /annotations/verifyFrame` with `{ videoId, frameNumber }`

use super::{GatewayError, VerificationGateway};
use crate::models::{Annotation, AnnotationCollection, AnnotationQuery, FrameCommit, VideoCollection};
use async_trait::async_trait;
use avr_common::config::GatewayConfig;
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// User-Agent header sent with every request
const USER_AGENT: &str = concat!("avr-verify/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed gateway
#[derive(Debug, Clone)]
pub struct HttpGateway {
    /// HTTP client for API requests (carries auth header and timeout)
    http_client: Client,
    /// Base URL without trailing slash
    base_url: String,
}

impl HttpGateway {
    /// Create a gateway for `base_url`, optionally authenticating with a bearer token
    pub fn new(
        base_url: impl Into<String>,
        token: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));

        if let Some(token) = token {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| GatewayError::Config(format!("Invalid API token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let http_client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Self::new(
            config.base_url.clone(),
            config.token.as_deref(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let url = self.url(path);
        debug!(url = %url, "GET");

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| GatewayError::Network(format!("GET {} failed: {}", path, e)))?;

        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(format!("Failed to parse {} response: {}", path, e)))
    }
}

/// Turn non-2xx responses into `GatewayError::Api`
async fn check_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Api(status.as_u16(), body))
}

#[async_trait]
impl VerificationGateway for HttpGateway {
    async fn list_collections(&self) -> Result<Vec<AnnotationCollection>, GatewayError> {
        self.get_json("/annotationCollections", &[]).await
    }

    async fn list_video_collections(&self) -> Result<Vec<VideoCollection>, GatewayError> {
        self.get_json("/videoCollections", &[]).await
    }

    async fn list_annotations(&self, query: &AnnotationQuery) -> Result<Vec<Annotation>, GatewayError> {
        let mut params: Vec<(&str, String)> = query
            .collections
            .iter()
            .map(|id| ("collections", id.to_string()))
            .collect();
        params.push(("excludeTracking", query.exclude_tracking.to_string()));
        params.push(("trackingFirst", query.tracking_first.to_string()));

        let annotations: Vec<Annotation> = self.get_json("/annotations/byCollections", &params).await?;

        debug!(
            collections = ?query.collections,
            count = annotations.len(),
            "Fetched annotations"
        );

        Ok(annotations)
    }

    async fn commit_frame_verified(&self, commit: &FrameCommit) -> Result<(), GatewayError> {
        let path = "/annotations/verifyFrame";

        let response = self
            .http_client
            .post(self.url(path))
            .json(commit)
            .send()
            .await
            .map_err(|e| GatewayError::Network(format!("POST {} failed: {}", path, e)))?;

        check_status(response).await?;

        debug!(
            video_id = commit.video_id,
            frame_number = commit.frame_number,
            "Frame verified"
        );

        Ok(())
    }
}
