//! HTTP transport for the CFS API.
//!
//! The command tree only describes requests; [`ApiClient`] sends them.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

use crate::{configuration::Configuration, exit_codes::CfsExitCode, model::ApiRequest};

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Error emitted while talking to the CFS API
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Request failed with status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
    #[error("Invalid request URL for '{path}': {cause}")]
    InvalidUrl {
        path: String,
        #[source]
        cause: url::ParseError,
    },
    #[error("Failed to read the configured API location: {0}")]
    Configuration(#[from] crate::configuration::ConfigurationError),
}

impl ApiError {
    pub fn exit_code(&self) -> CfsExitCode {
        match self {
            ApiError::HttpError(_) => CfsExitCode::NetworkError,
            ApiError::UnexpectedStatus { .. } => CfsExitCode::ApiError,
            ApiError::InvalidUrl { .. } => CfsExitCode::UsageError,
            ApiError::Configuration(_) => CfsExitCode::ConfigError,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(configuration: &Configuration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(configuration.timeout()))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: configuration.api_base_url()?,
            token: configuration.token().map(str::to_string),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL of a request, query string included.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(request.path.trim_start_matches('/'))
            .map_err(|cause| ApiError::InvalidUrl {
                path: request.path.clone(),
                cause,
            })?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    /// Send one request. An empty response body yields `None`.
    pub async fn send(&self, request: &ApiRequest) -> Result<Option<Value>, ApiError> {
        let url = self.url_for(request)?;
        debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method.into(), url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            trace!("Request body: {}", body);
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        trace!("Response {}: {}", status, text);

        if !status.is_success() {
            return Err(ApiError::UnexpectedStatus { status, body: text });
        }
        if text.trim().is_empty() {
            return Ok(None);
        }
        // non-JSON success bodies are passed through as plain strings
        Ok(Some(
            serde_json::from_str(&text).unwrap_or(Value::String(text)),
        ))
    }
}
