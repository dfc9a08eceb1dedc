use thiserror::Error;

/// The build request itself did not produce a build outcome
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Server answered without a build result (validation, rate limit, ...)
    #[error("{message}")]
    Rejected { status: u16, message: String },
}
