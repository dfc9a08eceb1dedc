//! Transport to the build server

use async_trait::async_trait;
use build_types::{BuildRequest, BuildResult, BuildStatus};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;

const DEFAULT_ERROR_MESSAGE: &str = "Build failed";

/// Operations a [`crate::BuildSession`] needs from the server
#[async_trait]
pub trait BuildClient: Send + Sync {
    /// `Ok` carries the build outcome, successful or not; `Err` means no
    /// outcome was obtained.
    async fn trigger_build(&self, request: &BuildRequest) -> Result<BuildResult, ClientError>;

    async fn build_status(&self) -> Result<BuildStatus, ClientError>;

    /// Artifact URL with a cache-busting query so viewers re-fetch it
    fn pdf_url(&self) -> String;
}

/// `reqwest` client for the OverTeX HTTP API
#[derive(Debug, Clone)]
pub struct HttpBuildClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpBuildClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl BuildClient for HttpBuildClient {
    async fn trigger_build(&self, request: &BuildRequest) -> Result<BuildResult, ClientError> {
        let response = self
            .http
            .post(self.url("/api/build"))
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!("POST /api/build -> {}", status);

        match status {
            StatusCode::OK => Ok(serde_json::from_slice(&body)?),
            // A failed build is reported as 500 with a full BuildResult; other
            // 500 bodies are server faults.
            StatusCode::INTERNAL_SERVER_ERROR => {
                let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
                if value.get("logs").is_some_and(Value::is_array) {
                    Ok(serde_json::from_value(value)?)
                } else {
                    Err(rejected(status, &value))
                }
            }
            _ => {
                let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
                Err(rejected(status, &value))
            }
        }
    }

    async fn build_status(&self) -> Result<BuildStatus, ClientError> {
        let status = self
            .http
            .get(self.url("/api/build/status"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(status)
    }

    fn pdf_url(&self) -> String {
        format!(
            "{}?t={}",
            self.url("/api/pdf"),
            chrono::Utc::now().timestamp_millis()
        )
    }
}

fn rejected(status: StatusCode, body: &Value) -> ClientError {
    let message = body
        .get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .unwrap_or(DEFAULT_ERROR_MESSAGE)
        .to_string();
    ClientError::Rejected {
        status: status.as_u16(),
        message,
    }
}
